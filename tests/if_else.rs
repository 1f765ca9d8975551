use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const SRC_PATH: &str = "./demos/if_else.bp";
const EXPECTED: Expected = Expected {
    stdout: "> big\n> right\n",
    stderr: "",
};

#[test]
fn interpret_if_else() -> Result<(), Box<dyn Error>> {
    check_run(Path::new(SRC_PATH), EXPECTED)
}
