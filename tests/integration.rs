use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> bool {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_childweight"));

    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command");

    if !output.status.success() {
        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");
        eprintln!("binary failed with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n");
    }

    output.status.success()
}

fn make_test_dir(name: &str, config_contents: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");

    test_dir
}

#[test]
fn basic_workflow() {
    let config_contents = String::new()
        + "[cohort]\n"
        + "age = [10.0, 6.5, 14.0]\n"
        + "sex = [1.0, 0.0, 0.0]\n"
        + "bmi_cat = [2, 4, 1]\n"
        + "ffm = [25.0, 18.0, 40.0]\n"
        + "fm = [8.0, 9.0, 4.5]\n"
        + "\n"
        + "[intake]\n"
        + "logistic = { k = 1800.0, q = 1.0, a = 500.0, b = 0.01, nu = 1.0, c = 1.0 }\n"
        + "\n"
        + "[solver]\n"
        + "dt = 1.0\n"
        + "days = 365.0\n"
        + "reference = \"mean\"\n"
        + "check = true\n";

    let test_dir = make_test_dir("basic_workflow", &config_contents);
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(run_bin(&["--sim-dir", test_dir_str, "run"]));
    assert!(run_bin(&["--sim-dir", test_dir_str, "run"]));
    assert!(test_dir.join("run-0000").join("trajectory.msgpack").is_file());
    assert!(test_dir.join("run-0001").join("trajectory.msgpack").is_file());

    assert!(run_bin(&["--sim-dir", test_dir_str, "analyze"]));
    assert!(test_dir.join("run-0000").join("results.msgpack").is_file());
    assert!(test_dir.join("run-0001").join("results.msgpack").is_file());

    assert!(run_bin(&["--sim-dir", test_dir_str, "clean"]));
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn conflicting_intake_is_rejected() {
    let config_contents = String::new()
        + "[cohort]\n"
        + "age = [10.0]\n"
        + "sex = [1.0]\n"
        + "bmi_cat = [2]\n"
        + "ffm = [25.0]\n"
        + "fm = [8.0]\n"
        + "\n"
        + "[intake]\n"
        + "logistic = { k = 1800.0, q = 1.0, a = 500.0, b = 0.01, nu = 1.0, c = 1.0 }\n"
        + "table = [[1600.0], [1600.0]]\n"
        + "\n"
        + "[solver]\n"
        + "dt = 1.0\n"
        + "days = 1.0\n";

    let test_dir = make_test_dir("conflicting_intake", &config_contents);
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(!run_bin(&["--sim-dir", test_dir_str, "run"]));
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn short_intake_table_is_rejected() {
    let config_contents = String::new()
        + "[cohort]\n"
        + "age = [8.0]\n"
        + "sex = [0.0]\n"
        + "bmi_cat = [3]\n"
        + "ffm = [22.0]\n"
        + "fm = [6.0]\n"
        + "\n"
        + "[intake]\n"
        + "table = [[1700.0], [1700.0], [1700.0]]\n"
        + "\n"
        + "[solver]\n"
        + "dt = 1.0\n"
        + "days = 5.0\n"
        + "reference = \"median\"\n";

    let test_dir = make_test_dir("short_intake_table", &config_contents);
    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    assert!(!run_bin(&["--sim-dir", test_dir_str, "run"]));

    let config_contents = config_contents.replace("days = 5.0", "days = 2.0");
    fs::write(test_dir.join("config.toml"), config_contents).expect("failed to write config file");
    assert!(run_bin(&["--sim-dir", test_dir_str, "run"]));

    fs::remove_dir_all(&test_dir).ok();
}
