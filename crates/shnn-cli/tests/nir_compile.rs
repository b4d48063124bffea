use assert_cmd::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tempfile::tempdir;
use assert_cmd::Command;

fn compile_nir_to(path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("snn")?;
    let path_str = path.to_str().expect("temp path to UTF-8");
    cmd.args([
        "nir", "compile",
        "-o", path_str,
        "--neurons", "lif",
        "--plasticity", "stdp",
        "--inputs", "4",
        "--hidden", "4",
        "--outputs", "2",
        "--topology", "fully-connected",
        "--steps", "100",
        "--dt-us", "100",
        "--stimulus", "poisson",
        "--stimulus-rate", "5.0",
    ]);
    cmd.assert().success();
    Ok(())
}

#[test]
fn nir_compile_and_verify() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let model = tmp.path().join("model.nirt");

    compile_nir_to(&model)?;

    assert!(model.exists(), "compiled NIR file should exist");

    let mut verify = Command::cargo_bin("snn")?;
    verify.args(["nir", "verify", &model.to_string_lossy()]);
    verify.assert().success();

    Ok(())
}

#[test]
fn nir_generate_writes_translation_units() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let model = tmp.path().join("m.nirt");
    let out_dir = tmp.path().join("generated");

    compile_nir_to(&model)?;
    assert!(model.exists(), "compiled NIR file should exist");

    let mut generate = Command::cargo_bin("snn")?;
    generate.args([
        "nir", "generate",
        model.to_str().expect("temp path to UTF-8"),
        "--output", out_dir.to_str().expect("temp path to UTF-8"),
    ]);
    generate.assert().success();

    assert!(out_dir.join("neuronFnct.cc").exists(), "neuron update source should be written");
    assert!(out_dir.join("synapseFnct.cc").exists(), "synapse update source should be written");
    assert!(out_dir.join("learnPostFnct.cc").exists(), "post-learning source should be written when stdp is present");

    Ok(())
}
