use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const BP_PATH: &str = "./target/debug/bp";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_interpreter(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(BP_PATH).arg(src_path).output()
}

pub fn check_run(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_interpreter(src_path)?;

    expected.assert_matches(&output)?;
    assert!(
        output.status.success(),
        "bp exited with status {:?}",
        output.status.code()
    );

    Ok(())
}

pub fn check_failing_run(src_path: &Path) -> Result<(), Box<dyn Error>> {
    let output = run_interpreter(src_path)?;

    println!("{output:?}");
    assert!(
        !output.status.success(),
        "bp should exit with a non-zero status"
    );

    Ok(())
}
