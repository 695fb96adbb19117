//! Neuroimaging and electrophysiology packages that are cited by DOI only.

use crate::citation::CiteOptions;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};

inventory::submit! {
    InjectionModule { name: "builtin::biosig", unit: "biosig", inject: inject_biosig }
}

inventory::submit! {
    InjectionModule { name: "builtin::dipy", unit: "dipy", inject: inject_dipy }
}

inventory::submit! {
    InjectionModule { name: "builtin::mne", unit: "mne", inject: inject_mne }
}

inventory::submit! {
    InjectionModule { name: "builtin::nibabel", unit: "nibabel", inject: inject_nibabel }
}

inventory::submit! {
    InjectionModule { name: "builtin::nipy", unit: "nipy", inject: inject_nipy }
}

inventory::submit! {
    InjectionModule { name: "builtin::psychopy", unit: "psychopy", inject: inject_psychopy }
}

inventory::submit! {
    InjectionModule { name: "builtin::skimage", unit: "skimage", inject: inject_skimage }
}

fn implementation(description: &str) -> CiteOptions {
    CiteOptions::new().description(description).tags(["implementation"])
}

fn inject_biosig(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "biosig",
        None,
        Entry::doi("10.1109/MC.2008.407"),
        CiteOptions::new().description("I/O library for biosignal data formats"),
    );
    Ok(())
}

fn inject_dipy(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "dipy",
        None,
        Entry::doi("10.3389/fninf.2014.00008"),
        implementation("Dipy, a library for the analysis of diffusion MRI data."),
    );
    Ok(())
}

fn inject_mne(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "mne",
        None,
        Entry::doi("10.1016/j.neuroimage.2013.10.027"),
        implementation("MNE software for processing MEG and EEG data."),
    );
    injector.register(
        "mne",
        None,
        Entry::doi("10.3389/fnins.2013.00267"),
        implementation("MEG and EEG data analysis with MNE-Python."),
    );
    Ok(())
}

fn inject_nibabel(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "nibabel",
        None,
        Entry::doi("10.5281/zenodo.60847"),
        implementation("I/O library to access to common neuroimaging file formats").cite_module(true),
    );
    Ok(())
}

fn inject_nipy(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "nipy",
        None,
        Entry::doi("10.1016/S1053-8119(09)72223-2"),
        implementation("Library fMRI data analysis"),
    );

    for (member, description) in [
        ("spectral_decomposition", "PCA decomposition of symbolic HRF shifted over time"),
        ("taylor_approx", "A Taylor series approximation of an HRF shifted over time"),
    ] {
        injector.register(
            "nipy.modalities.fmri.fmristat.hrf",
            Some(member),
            Entry::doi("10.1006/nimg.2002.1096"),
            implementation(description),
        );
    }
    Ok(())
}

fn inject_psychopy(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "psychopy",
        None,
        Entry::doi("10.1016/j.jneumeth.2006.11.017"),
        implementation("PsychoPy -- Psychophysics software in Python."),
    );
    injector.register(
        "psychopy",
        None,
        Entry::doi("10.3389/neuro.11.010.2008"),
        implementation("Generating stimuli for neuroscience using PsychoPy."),
    );
    Ok(())
}

fn inject_skimage(injector: &Injector) -> anyhow::Result<()> {
    injector.register(
        "skimage",
        None,
        Entry::doi("10.7717/peerj.453"),
        implementation("scikit-image: Image processing in Python."),
    );
    Ok(())
}
