mod common;

use std::path::{Path, PathBuf};

use tbwatch::fs::mock::MockFileSystem;
use tbwatch::fs::{walk, walk_pruned, FsEntry, RealFileSystem};

fn visited(fs: &dyn tbwatch::fs::FileSystem, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = Vec::new();
    walk(fs, root, &mut |entry: &FsEntry| -> anyhow::Result<()> {
        seen.push(entry.path.clone());
        Ok(())
    })?;
    Ok(seen)
}

#[test]
fn siblings_are_visited_before_recursing() {
    let fs = MockFileSystem::new();
    fs.add_file("src/x/deep.v", "");
    fs.add_file("src/a.v", "");
    fs.add_file("src/y/other.v", "");
    fs.add_file("src/b.v", "");

    let seen = visited(&fs, Path::new("src")).unwrap();

    let expected: Vec<PathBuf> = [
        "src/x",
        "src/a.v",
        "src/y",
        "src/b.v",
        "src/x/deep.v",
        "src/y/other.v",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(seen, expected);
}

#[test]
fn directory_is_always_visited_before_its_contents() {
    let fs = MockFileSystem::new();
    fs.add_file("root/a/b/c/leaf.txt", "");
    fs.add_file("root/a/side.txt", "");
    fs.add_file("root/z.txt", "");

    let seen = visited(&fs, Path::new("root")).unwrap();

    for (idx, path) in seen.iter().enumerate() {
        if let Some(parent) = path.parent() {
            if parent != Path::new("root") {
                let parent_idx = seen.iter().position(|p| p == parent).unwrap();
                assert!(parent_idx < idx, "{parent:?} visited after {path:?}");
            }
        }
    }
    assert_eq!(seen.len(), 6);
}

#[test]
fn callback_error_aborts_the_walk() {
    let fs = MockFileSystem::new();
    fs.add_file("root/a.txt", "");
    fs.add_file("root/b.txt", "");
    fs.add_file("root/sub/c.txt", "");

    let mut seen = Vec::new();
    let result = walk(&fs, Path::new("root"), &mut |entry: &FsEntry| -> anyhow::Result<()> {
        seen.push(entry.path.clone());
        if entry.path.ends_with("b.txt") {
            anyhow::bail!("stop here");
        }
        Ok(())
    });

    assert!(result.is_err());
    assert_eq!(seen, vec![PathBuf::from("root/a.txt"), PathBuf::from("root/b.txt")]);
}

#[test]
fn listing_error_is_returned() {
    let fs = MockFileSystem::new();
    fs.add_file("root/sub/c.txt", "");
    fs.fail_on("root/sub");

    let err = visited(&fs, Path::new("root")).unwrap_err();
    assert!(err.to_string().contains("injected failure"));
}

#[test]
fn pruned_subtree_is_never_listed_or_stated() {
    let fs = MockFileSystem::new();
    fs.add_file("root/a.v", "");
    fs.add_file("root/build/out/a_tb.v.out", "");
    fs.add_file("root/lib/b.v", "");
    fs.fail_on("root/build");

    let mut seen = Vec::new();
    walk_pruned(
        &fs,
        Path::new("root"),
        &|path: &Path| path.starts_with("root/build"),
        &mut |entry: &FsEntry| -> anyhow::Result<()> {
            seen.push(entry.path.clone());
            Ok(())
        },
    )
    .unwrap();

    let expected: Vec<PathBuf> = ["root/a.v", "root/lib", "root/lib/b.v"]
        .iter()
        .map(PathBuf::from)
        .collect();
    assert_eq!(seen, expected);
}

#[test]
fn real_filesystem_walk_is_sorted_by_name() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    common::write_file(root, "b.v", "");
    common::write_file(root, "a_tb.v", "");
    common::write_file(root, "a.v", "");
    common::write_file(root, "lib/z.v", "");

    let seen: Vec<String> = visited(&RealFileSystem, root)
        .unwrap()
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(seen, vec!["a.v", "a_tb.v", "b.v", "lib", "lib/z.v"]);
}
