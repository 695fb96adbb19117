use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::numpy",
        unit: "numpy",
        inject,
    }
}

const NUMPY_ARRAY: &str = r"@article{van2011numpy,
    title={The NumPy array: a structure for efficient numerical computation},
    author={Van Der Walt, Stefan and Colbert, S Chris and Varoquaux, Gael},
    journal={Computing in Science \& Engineering},
    volume={13},
    number={2},
    pages={22--30},
    year={2011},
    publisher={AIP Publishing},
    doi={10.1109/MCSE.2011.37}
}";

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "numpy",
        None,
        Entry::bibtex(NUMPY_ARRAY)?,
        CiteOptions::new()
            .description("Scientific tools library")
            .cite_module(true)
            .tags(["implementation"]),
    );
    Ok(())
}
