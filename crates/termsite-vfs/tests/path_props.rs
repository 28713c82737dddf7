use proptest::prelude::*;
use termsite_vfs::path::{join, ROOT};
use termsite_vfs::{is_syntactically_valid, parent_of, PathResolver, VirtualFileSystem};

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-][A-Za-z0-9._-]{0,7}".prop_filter("no dot segments", |s| s != "." && s != "..")
}

fn absolute_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..6).prop_map(|segs| {
        segs.iter().fold(ROOT.to_string(), |acc, seg| join(&acc, seg))
    })
}

fn target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("~".to_string()),
        Just("-".to_string()),
        Just("..".to_string()),
        Just(".".to_string()),
        absolute_path(),
        segment(),
        prop::collection::vec(segment(), 1..4).prop_map(|segs| segs.join("/")),
    ]
}

proptest! {
    #[test]
    fn resolved_paths_are_absolute(cwd in absolute_path(), target in target()) {
        let resolver = PathResolver::for_nickname("alice");
        let resolved = resolver.resolve(&cwd, &target);
        prop_assert!(resolved.starts_with('/'));
        prop_assert!(is_syntactically_valid(&resolved));
    }

    #[test]
    fn parent_chain_reaches_root(path in absolute_path()) {
        let mut current = path;
        for _ in 0..8 {
            current = parent_of(&current);
        }
        prop_assert_eq!(current.as_str(), ROOT);
        prop_assert_eq!(parent_of(ROOT), ROOT);
    }

    #[test]
    fn ensured_directories_are_found(path in absolute_path()) {
        let mut fs = VirtualFileSystem::new();
        fs.ensure_directory(&path).unwrap();
        prop_assert!(fs.is_directory(&path));
    }
}

#[test]
fn mkdir_twice_leaves_one_child() {
    let mut fs = VirtualFileSystem::new();
    fs.ensure_directory("/home/alice").unwrap();
    fs.create_directory("/home/alice", "x").unwrap();
    assert!(fs.create_directory("/home/alice", "x").is_err());

    let home = fs.node_at("/home/alice").unwrap();
    let named_x = home.children().iter().filter(|c| c.name() == "x").count();
    assert_eq!(named_x, 1);
}
