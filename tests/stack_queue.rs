use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const SRC_PATH: &str = "./demos/stack_queue.bp";
const EXPECTED: Expected = Expected {
    stdout: "> 3\n> 2\n> 1\n> 2\n",
    stderr: "",
};

#[test]
fn interpret_stack_queue() -> Result<(), Box<dyn Error>> {
    check_run(Path::new(SRC_PATH), EXPECTED)
}
