use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::matplotlib",
        unit: "matplotlib",
        inject,
    }
}

const HUNTER_2007: &str = r"@Article{Hunter:2007,
    Author    = {Hunter, J. D.},
    Title     = {Matplotlib: A 2D graphics environment},
    Journal   = {Computing in Science \& Engineering},
    Volume    = {9},
    Number    = {3},
    Pages     = {90--95},
    publisher = {IEEE COMPUTER SOC},
    doi       = {10.1109/MCSE.2007.55},
    year      = 2007
}";

/// Concept DOI of the latest release on Zenodo.
const LATEST_RELEASE_DOI: &str = "10.5281/zenodo.2893252";

fn inject(injector: &Injector) -> anyhow::Result<()> {
    let options = CiteOptions::new().description("Plotting with Python").tags(["implementation"]);

    injector.register("matplotlib", None, Entry::bibtex(HUNTER_2007)?, options.clone());
    injector.register("matplotlib", None, Entry::doi(LATEST_RELEASE_DOI), options);
    Ok(())
}
