use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const SRC_PATH: &str = "./demos/priority_queue.bp";
const EXPECTED: Expected = Expected {
    stdout: "> hi\n> mid\n",
    stderr: "",
};

#[test]
fn interpret_priority_queue() -> Result<(), Box<dyn Error>> {
    check_run(Path::new(SRC_PATH), EXPECTED)
}
