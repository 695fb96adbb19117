use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule {
        name: "builtin::sklearn",
        unit: "sklearn",
        inject,
    }
}

const SCIKIT_LEARN: &str = r#"@article{pedregosa2011scikit,
    title={Scikit-learn: Machine learning in Python},
    author={Pedregosa, Fabian and Varoquaux, Ga{\"e}l and Gramfort, Alexandre and Michel, Vincent and Thirion, Bertrand and Grisel, Olivier and Blondel, Mathieu and Prettenhofer, Peter and Weiss, Ron and Dubourg, Vincent and others},
    journal={The Journal of Machine Learning Research},
    volume={12},
    pages={2825--2830},
    year={2011},
    publisher={JMLR. org}
}"#;

const DBSCAN: &str = r#"@inproceedings{ester1996density,
    title={A density-based algorithm for discovering clusters in large spatial databases with noise.},
    author={Ester, Martin and Kriegel, Hans-Peter and Sander, J{\"o}rg and Xu, Xiaowei},
    booktitle={Kdd},
    volume={96},
    number={34},
    pages={226--231},
    year={1996}
}"#;

fn reference(description: &str) -> CiteOptions {
    CiteOptions::new().description(description).tags(["reference"])
}

fn inject(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "sklearn",
        None,
        Entry::bibtex(SCIKIT_LEARN)?,
        CiteOptions::new().description("Machine Learning library"),
    );

    injector.register(
        "sklearn.cluster.affinity_propagation_",
        None,
        Entry::doi("10.1126/science.1136800"),
        reference("Affinity propagation clustering algorithm"),
    );

    let members = [
        (
            "sklearn.cluster.bicluster",
            "SpectralCoclustering",
            Entry::doi("10.1.1.140.301"),
            reference("Spectral Coclustering algorithm"),
        ),
        (
            "sklearn.cluster.bicluster",
            "SpectralBiclustering",
            Entry::doi("10.1.1.135.1608"),
            reference("Spectral Biclustering algorithm"),
        ),
        (
            "sklearn.cluster.birch",
            "Birch",
            Entry::doi("10.1145/233269.233324"),
            reference("BIRCH clustering algorithm"),
        ),
        (
            "sklearn.cluster.birch",
            "Birch",
            Entry::url("https://code.google.com/p/jbirch/"),
            CiteOptions::new()
                .description("Java implementation of BIRCH clustering algorithm")
                .tags(["implementation"]),
        ),
        (
            "sklearn.cluster.dbscan_",
            "dbscan",
            Entry::bibtex(DBSCAN)?,
            reference("dbscan clustering algorithm"),
        ),
        (
            "sklearn.cluster.mean_shift_",
            "MeanShift",
            Entry::doi("10.1109/34.1000236"),
            reference("Mean shift clustering algorithm"),
        ),
        (
            "sklearn.cluster.spectral",
            "discretize",
            Entry::doi("10.1109/ICCV.2003.1238361"),
            reference("Multiclass spectral clustering"),
        ),
        (
            "sklearn.cluster.spectral",
            "spectral_clustering",
            Entry::doi("10.1.1.160.2324"),
            reference("Spectral clustering"),
        ),
        (
            "sklearn.cluster.spectral",
            "spectral_clustering",
            Entry::doi("10.1.1.165.9323"),
            reference("Spectral clustering"),
        ),
    ];

    for (unit, member, entry, options) in members {
        injector.register(unit, Some(member), entry, options);
    }
    Ok(())
}
