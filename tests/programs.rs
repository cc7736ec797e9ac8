//! Runs every program under `demos/programs` and compares the rendered output
//! with the matching `.out` file. A `.in` file, when present, is the input.

use std::{fs, path::PathBuf};

use regasm::{compile, execute, input};

fn programs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/programs")
}

#[test]
fn demo_programs() {
    let mut programs: Vec<PathBuf> = fs::read_dir(programs_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "asm"))
        .collect();
    programs.sort();
    assert!(!programs.is_empty());

    for path in programs {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let input_path = path.with_file_name(format!("{}.in", name));
        let values = if input_path.exists() {
            input::load_input(&input_path).unwrap()
        } else {
            Vec::new()
        };

        let source = input::load_program(&path).unwrap();
        let program = compile(&source).unwrap_or_else(|err| panic!("{}: {}", name, err));
        let output = execute(&program, &values).unwrap_or_else(|err| panic!("{}: {}", name, err));

        let expected = fs::read_to_string(path.with_file_name(format!("{}.out", name))).unwrap();
        let expected: Vec<&str> = expected
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let received: Vec<String> = output.iter().map(ToString::to_string).collect();

        assert_eq!(received, expected, "output of {}", name);
    }
}
