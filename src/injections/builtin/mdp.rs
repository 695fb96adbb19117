use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::mdp",
        unit: "mdp",
        inject,
    }
}

const NIPALS: &str = r"@incollection{Word1966,
    author={Wold, H.},
    title={Nonlinear estimation by iterative least squares procedures.},
    booktitle={Research Papers in Statistics},
    publisher={Wiley},
    year={1966},
    editor={David, F.},
    pages={411--444},
}";

const TDSEP: &str = r"@conference{ZieheMuller1998,
    author={Ziehe, Andreas and Muller, Klaus-Robert},
    title={TDSEP an efficient algorithm for blind separation using time structure.},
    booktitle={Proc. 8th Int. Conf. Artificial Neural Networks},
    year={1998},
    editor={Niklasson, L, Boden, M, and Ziemke, T},
    publisher={ICANN}
}";

const XSFA: &str = r"@article{SprekelerZitoWiskott2009,
    author={Sprekeler, H., Zito, T., and Wiskott, L.},
    title={An Extension of Slow Feature Analysis for Nonlinear Blind Source Separation.},
    journal={Journal of Machine Learning Research.},
    year={2009},
    volume={15},
    pages={921--947},
}";

const FDA: &str = r"@book{Bishop2011,
    author={Bishop, Christopher M.},
    title={Neural Networks for Pattern Recognition},
    publisher={Oxford University Press, Inc},
    year={2011},
    pages={105--112},
}";

const NODES: &str = "mdp.nodes";

fn implementation(description: &str) -> CiteOptions {
    CiteOptions::new().description(description).tags(["implementation"])
}

fn edu(description: &str) -> CiteOptions {
    CiteOptions::new().description(description).tags(["edu"])
}

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "mdp",
        None,
        Entry::doi("10.3389/neuro.11.008.2008"),
        implementation("Modular toolkit for Data Processing (MDP): a Python data processing framework"),
    );

    let nodes = [
        (
            "PCANode.train",
            Entry::doi("10.1007/b98835"),
            implementation("Principal Component Analysis (and filtering)"),
        ),
        (
            "NIPALSNode.train",
            Entry::bibtex(NIPALS)?,
            edu("Principal Component Analysis using the NIPALS algorithm."),
        ),
        (
            "FastICANode.train",
            Entry::doi("10.1109/72.761722"),
            implementation("Independent Component Analysis using the FastICA algorithm"),
        ),
        (
            "CuBICANode.train",
            Entry::doi("10.1109/TSP.2004.826173"),
            implementation("Independent Component Analysis using the CuBICA algorithm."),
        ),
        (
            "TDSEPNode.train",
            Entry::bibtex(TDSEP)?,
            edu("Independent Component Analysis using the TDSEP algorithm"),
        ),
        (
            "JADENode.train",
            Entry::doi("10.1049/ip-f-2.1993.0054"),
            implementation("Independent Component Analysis using the JADE algorithm"),
        ),
        (
            "JADENode.train",
            Entry::doi("10.1162/089976699300016863"),
            implementation("Independent Component Analysis using the JADE algorithm"),
        ),
        (
            "SFANode.train",
            Entry::doi("10.1162/089976602317318938"),
            implementation("Slow Feature Analysis"),
        ),
        (
            "SFA2Node.train",
            Entry::doi("10.1162/089976602317318938"),
            implementation("Slow Feature Analysis (via the space of inhomogeneous polynomials)"),
        ),
        (
            "ISFANode.train",
            Entry::doi("10.1007/978-3-540-30110-3_94"),
            implementation("Independent Slow Feature Analysis"),
        ),
        (
            "XSFANode.train",
            Entry::bibtex(XSFA)?,
            edu("Non-linear Blind Source Separation using Slow Feature Analysis"),
        ),
        (
            "FDANode.train",
            Entry::bibtex(FDA)?,
            edu("(generalized) Fisher Discriminant Analysis"),
        ),
    ];

    for (member, entry, options) in nodes {
        injector.register(NODES, Some(member), entry, options);
    }
    Ok(())
}
