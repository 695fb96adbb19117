use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::pandas",
        unit: "pandas",
        inject,
    }
}

const PANDAS: &str = r"@InProceedings{ mckinney-proc-scipy-2010,
    author    = { Wes McKinney },
    title     = { Data Structures for Statistical Computing in Python },
    booktitle = { Proceedings of the 9th Python in Science Conference },
    pages     = { 51 - 56 },
    year      = { 2010 },
    editor    = { St\'efan van der Walt and Jarrod Millman }
}";

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "pandas",
        None,
        Entry::bibtex(PANDAS)?,
        CiteOptions::new().description("Data analysis library for tabular data"),
    );
    Ok(())
}
