use crate::citation::CiteOptions;
use crate::collector::Conditions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};
use crate::version::VersionBounds;

inventory::submit! {
    InjectionModule {
        name: "builtin::scipy",
        unit: "scipy",
        inject,
    }
}

const SCIPY: &str = r#"@Misc{JOP+01,
    author =    {Eric Jones and Travis Oliphant and Pearu Peterson and others},
    title =     {{SciPy}: Open source scientific tools for {Python}},
    year =      {2001--},
    url = "http://www.scipy.org/",
    note = {[Online; accessed 2015-07-13]}
}"#;

const HIERARCHY: &str = "scipy.cluster.hierarchy";

/// General references on hierarchical clustering.
const HIERARCHY_REFERENCES: [&str; 7] = [
    r"@article{johnson1967hierarchical,
    title={Hierarchical clustering schemes},
    author={Johnson, Stephen C},
    journal={Psychometrika},
    volume={32},
    number={3},
    pages={241--254},
    year={1967},
    publisher={Springer}
}",
    r"@article{sneath1962numerical,
    title={Numerical taxonomy},
    author={Sneath, Peter HA and Sokal, Robert R},
    journal={Nature},
    volume={193},
    number={4818},
    pages={855--860},
    year={1962},
    publisher={Nature Publishing Group}
}",
    r"@article{batagelj1995comparing,
    title={Comparing resemblance measures},
    author={Batagelj, Vladimir and Bren, Matevz},
    journal={Journal of classification},
    volume={12},
    number={1},
    pages={73--90},
    year={1995},
    publisher={Springer}
}",
    r"@book{sokal1958statistical,
    author = {Sokal, R R and Michener, C D and {University of Kansas}},
    title = {{A Statistical Method for Evaluating Systematic Relationships}},
    publisher = {University of Kansas},
    year = {1958},
    series = {University of Kansas science bulletin}
}",
    r"@article{edelbrock1979mixture,
    title={Mixture model tests of hierarchical clustering algorithms: the problem of classifying everybody},
    author={Edelbrock, Craig},
    journal={Multivariate Behavioral Research},
    volume={14},
    number={3},
    pages={367--384},
    year={1979},
    publisher={Taylor \& Francis}
}",
    r"@book{jain1988algorithms,
    title={Algorithms for clustering data},
    author={Jain, Anil K and Dubes, Richard C},
    year={1988},
    publisher={Prentice-Hall, Inc.}
}",
    r"@article{fisher1936use,
    title={The use of multiple measurements in taxonomic problems},
    author={Fisher, Ronald A},
    journal={Annals of eugenics},
    volume={7},
    number={2},
    pages={179--188},
    year={1936},
    publisher={Wiley Online Library}
}",
];

const WARD: &str = r"@article{ward1963hierarchical,
    title={Hierarchical grouping to optimize an objective function},
    author={Ward Jr, Joe H},
    journal={Journal of the American statistical association},
    volume={58},
    number={301},
    pages={236--244},
    year={1963},
    publisher={Taylor \& Francis}
}";

const GOWER: &str = r"@article{gower1969minimum,
    title={Minimum spanning trees and single linkage cluster analysis},
    author={Gower, John C and Ross, GJS},
    journal={Applied statistics},
    pages={54--64},
    year={1969},
    publisher={JSTOR}
}";

const SLINK: &str = r"@article{sibson1973slink,
    title={SLINK: an optimally efficient algorithm for the single-link cluster method},
    author={Sibson, Robin},
    journal={The Computer Journal},
    volume={16},
    number={1},
    pages={30--34},
    year={1973},
    publisher={Br Computer Soc}
}";

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "scipy",
        None,
        Entry::bibtex(SCIPY)?,
        CiteOptions::new().description("Scientific tools library").tags(["implementation"]),
    );

    let since = || VersionBounds::any().with_min("0.4.3");

    for raw in HIERARCHY_REFERENCES {
        injector.register_within(
            HIERARCHY,
            None,
            Entry::bibtex(raw)?,
            since(),
            CiteOptions::new().description("Hierarchical clustering").tags(["edu"]),
        );
    }

    // linkage cites by its `method` argument
    let single = || Conditions::new().on(1, "method", ["single", "DC_DEFAULT"]);

    injector.register_within(
        HIERARCHY,
        Some("linkage"),
        Entry::bibtex(WARD)?,
        since(),
        CiteOptions::new()
            .description("Ward hierarchical clustering")
            .tags(["reference"])
            .conditions(Conditions::new().on(1, "method", ["ward"])),
    );
    injector.register_within(
        HIERARCHY,
        Some("linkage"),
        Entry::bibtex(GOWER)?,
        since(),
        CiteOptions::new()
            .description("Single linkage hierarchical clustering")
            .tags(["reference"])
            .conditions(single()),
    );
    injector.register_within(
        HIERARCHY,
        Some("linkage"),
        Entry::bibtex(SLINK)?,
        since(),
        CiteOptions::new()
            .description("Single linkage hierarchical clustering")
            .tags(["implementation"])
            .conditions(single()),
    );
    Ok(())
}
