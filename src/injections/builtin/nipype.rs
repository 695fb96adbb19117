use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::nipype",
        unit: "nipype",
        inject,
    }
}

const SPM: &str = r"@book{FrackowiakFristonFrithDolanMazziotta1997,
    author={R.S.J. Frackowiak, K.J. Friston, C.D. Frith, R.J. Dolan, and J.C. Mazziotta},
    title={Human Brain Function},
    publisher={Academic Press USA},
    year={1997},
}";

const INTERFACES: &str = "nipype.interfaces";

fn implementation(description: &str) -> CiteOptions {
    CiteOptions::new().description(description).tags(["implementation"])
}

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "nipype",
        None,
        Entry::doi("10.3389/fninf.2011.00013"),
        implementation(
            "Nipype: a flexible, lightweight and extensible neuroimaging data processing framework in Python",
        ),
    );

    for (doi, description) in [
        (
            "10.1016/j.neuroimage.2004.07.051",
            "Advances in functional and structural MR image analysis and implementation as FSL",
        ),
        ("10.1016/j.neuroimage.2008.10.055", "Bayesian analysis of neuroimaging data in FSL"),
        ("10.1016/j.neuroimage.2011.09.015", "FSL."),
    ] {
        injector.register(INTERFACES, Some("fsl"), Entry::doi(doi), implementation(description));
    }

    injector.register(
        INTERFACES,
        Some("spm"),
        Entry::bibtex(SPM)?,
        implementation("The fundamental text on Statistical Parametric Mapping (SPM)"),
    );
    Ok(())
}
