use std::{
    fs::File,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use page_sim::{
    config::{Args, PolicyKind, SimConfig},
    references::load_references,
    rights::load_rights,
    simulate, LoadError, SimError,
};
use rand::Rng;
use serial_test::serial;

static RIGHTS_FILE: &str = "test_rights.txt";
static REFERENCES_FILE: &str = "test_references.txt";

fn write_file(name: &str, content: &str) {
    let mut file = File::create(name).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn args() -> Args {
    Args {
        rights: PathBuf::from(RIGHTS_FILE),
        references: PathBuf::from(REFERENCES_FILE),
        count: 100,
        frames: None,
        policy: PolicyKind::FirstPresent,
        dump_each: false,
    }
}

fn cleanup() {
    let _ = std::fs::remove_file(RIGHTS_FILE);
    let _ = std::fs::remove_file(REFERENCES_FILE);
}

#[test]
#[serial]
fn load_fewer_than_cap() {
    write_file(REFERENCES_FILE, "0000 R\n2000 W\nbroken\n4000 R\n");
    let refs = load_references(REFERENCES_FILE, 10).unwrap();
    assert_eq!(refs.len(), 3);
    let refs = load_references(REFERENCES_FILE, 2).unwrap();
    assert_eq!(refs.len(), 2);
    cleanup();
}

#[test]
#[serial]
fn load_random_trace() {
    let mut rng = rand::thread_rng();
    let mut content = String::new();
    let mut well_formed = 0;
    let lines = rng.gen_range(1..200);
    for _ in 0..lines {
        if rng.gen_bool(0.8) {
            let op = if rng.gen_bool(0.5) { "R" } else { "W" };
            content.push_str(&format!("{:04X} {}\n", rng.gen_range(0..0x10000u32), op));
            well_formed += 1;
        } else {
            content.push_str("garbage line here\n");
        }
    }
    write_file(REFERENCES_FILE, &content);
    let refs = load_references(REFERENCES_FILE, lines + 10).unwrap();
    assert_eq!(refs.len(), well_formed);
    cleanup();
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    cleanup();
    assert!(matches!(
        load_references(REFERENCES_FILE, 10),
        Err(LoadError::Io(e)) if e.kind() == ErrorKind::NotFound
    ));
    assert!(matches!(
        load_rights(RIGHTS_FILE, 8),
        Err(LoadError::Io(e)) if e.kind() == ErrorKind::NotFound
    ));

    let err = SimError::from(SimConfig::load(&args()).unwrap_err());
    assert!(matches!(err, SimError::Load(LoadError::Io(_))));
    assert!(err.to_string().starts_with("loading input: "));
}

#[test]
#[serial]
fn end_to_end() {
    write_file(RIGHTS_FILE, "frames 2\n0 7\n1 6\n2 4\n12 7\n");
    write_file(REFERENCES_FILE, "0000 R\n2000 W\n4000 R\n12000 W\n");
    let config = SimConfig::load(&args()).unwrap();
    assert_eq!(config.frames, 2);
    assert_eq!(config.warnings.len(), 1);

    let (out, summary) = simulate(&config, Vec::new()).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(summary.references, 4);
    assert_eq!(summary.faults, 3);
    assert_eq!(summary.evictions, 1);
    assert_eq!(summary.write_backs, 0);
    assert_eq!(summary.invalid, 1);

    assert!(out.contains("  evict page 0 from frame 000\n"));
    assert!(out.contains("4000 R -> page 2 fault frame 000 -> 000000\n"));
    assert!(out.contains("12000 W -> page 9 invalid\n"));
    // final table: page 0 gone, pages 1 and 2 resident
    assert!(out.contains("[0]: 7  0  0  0 000\n"));
    assert!(out.contains("[1]: 6  1  1  1 001\n"));
    assert!(out.contains("[2]: 4  1  1  0 000\n"));
    cleanup();
}

#[test]
#[serial]
fn frames_override_and_zero_frames() {
    write_file(RIGHTS_FILE, "frames 2\n");
    write_file(REFERENCES_FILE, "0000 R\n");
    let mut args = args();
    args.frames = Some(0);
    let config = SimConfig::load(&args).unwrap();
    assert_eq!(config.frames, 0);
    let err = simulate(&config, Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        page_sim::SimError::Pager(pager::PagerError::ReplacementExhausted)
    ));
    cleanup();
}

#[test]
#[serial]
fn dump_each_prints_every_step() {
    write_file(RIGHTS_FILE, "frames 1\n");
    write_file(REFERENCES_FILE, "0000 W\n2000 R\n");
    let mut args = args();
    args.dump_each = true;
    args.policy = PolicyKind::Lru;
    let config = SimConfig::load(&args).unwrap();
    let (out, summary) = simulate(&config, Vec::new()).unwrap();
    let out = String::from_utf8(out).unwrap();
    // initial, one per reference, final
    assert_eq!(out.matches("     A  P  R  M FRM").count(), 4);
    assert!(out.contains("(write back)"));
    assert_eq!(summary.write_backs, 1);
    cleanup();
}
