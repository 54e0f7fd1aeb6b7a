use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use kronosort::{run, BatchError, SortConfig, SortOptions};
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

fn noop(_: &str, _: u64, _: u64, _: &str) {}

/// Relative paths of every file under `root`, sorted.
fn tree(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                let parts: Vec<_> = rel.iter().map(|c| c.to_string_lossy().into_owned()).collect();
                out.push(parts.join("/"));
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

struct Fixture {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::create_dir(&input).unwrap();
    Fixture {
        _dir: dir,
        input,
        output,
    }
}

#[test]
fn test_sorts_archive_into_folders() {
    let fx = fixture();
    let zip = fx.input.join("phone.zip");
    write_zip(
        &zip,
        &[
            ("DCIM/Camera/IMG_20230615_photo.jpg", b"jpeg"),
            ("DCIM/Screenrecorder-2022-01-01.mp4", b"mp4"),
            ("Pictures/FB_IMG_20190101.jpg", b"fb"),
            ("Pictures/Screenshot_2021-02-03.png", b"shot"),
            ("Pictures/wallpaper.jpg", b"wall"),
            ("Movies/VID_2020-11-30_party.MOV", b"mov"),
            ("Takeout/IMG_20230615_photo.jpg.json", b"{}"),
            ("Takeout/index.html", b"<html>"),
            ("Takeout/readme.txt", b"text"),
            ("Takeout/scan.tiff", b"tiff"),
        ],
    );

    let summary = run(&SortOptions::new(&zip, &fx.output), &SortConfig::default(), &noop).unwrap();

    assert_eq!(
        tree(&fx.output),
        vec![
            "2020/11/VID_2020-11-30_party.MOV",
            "2023/06/IMG_20230615_photo.jpg",
            "Facebook/FB_IMG_20190101.jpg",
            "Others/wallpaper.jpg",
            "Screenrecorder/Screenrecorder-2022-01-01.mp4",
            "Screenshot/Screenshot_2021-02-03.png",
        ]
    );
    assert_eq!(summary.files_extracted(), 6);
    assert_eq!(summary.archives[0].skipped, 4);
    assert_eq!(summary.archives[0].dated_by_filename, 5);
    assert_eq!(
        fs::read(fx.output.join("2023/06/IMG_20230615_photo.jpg")).unwrap(),
        b"jpeg"
    );
}

#[test]
fn test_corrupt_archive_does_not_stop_batch() {
    let fx = fixture();
    write_zip(&fx.input.join("1.zip"), &[("IMG_20200101.jpg", b"one")]);
    fs::write(fx.input.join("2.zip"), b"PK\x03\x04 definitely truncated").unwrap();
    write_zip(&fx.input.join("3.zip"), &[("IMG_20210202.jpg", b"three")]);

    let summary = run(
        &SortOptions::new(&fx.input, &fx.output),
        &SortConfig::default(),
        &noop,
    )
    .unwrap();

    assert_eq!(summary.archives_found, 3);
    assert_eq!(summary.archives.len(), 2);
    assert_eq!(summary.failed_archives.len(), 1);
    assert!(summary.failed_archives[0].archive.ends_with("2.zip"));
    assert_eq!(
        tree(&fx.output),
        vec!["2020/01/IMG_20200101.jpg", "2021/02/IMG_20210202.jpg"]
    );
}

#[test]
fn test_collisions_across_archives_and_runs() {
    let fx = fixture();
    write_zip(&fx.input.join("a.zip"), &[("x/holiday.jpg", b"a")]);
    write_zip(&fx.input.join("b.zip"), &[("y/holiday.jpg", b"b")]);

    let options = SortOptions::new(&fx.input, &fx.output);
    run(&options, &SortConfig::default(), &noop).unwrap();
    // A second run never overwrites what the first one wrote
    run(&options, &SortConfig::default(), &noop).unwrap();

    assert_eq!(
        tree(&fx.output),
        vec![
            "Others/holiday.jpg",
            "Others/holiday_1.jpg",
            "Others/holiday_2.jpg",
            "Others/holiday_3.jpg",
        ]
    );
    assert_eq!(fs::read(fx.output.join("Others/holiday.jpg")).unwrap(), b"a");
    assert_eq!(fs::read(fx.output.join("Others/holiday_1.jpg")).unwrap(), b"b");
}

#[test]
fn test_dry_run_writes_nothing() {
    let fx = fixture();
    let zip = fx.input.join("a.zip");
    write_zip(
        &zip,
        &[("IMG_20230615.jpg", b"1"), ("other/IMG_20230615.jpg", b"2")],
    );

    let mut options = SortOptions::new(&zip, &fx.output);
    options.dry_run = true;
    let summary = run(&options, &SortConfig::default(), &noop).unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.files_extracted(), 2);
    assert_eq!(summary.archives[0].folders.get("2023/06"), Some(&2));
    assert!(!fx.output.exists());
}

#[test]
fn test_custom_config_is_honoured() {
    let fx = fixture();
    let zip = fx.input.join("a.zip");
    write_zip(&zip, &[("clip.mkv", b"mkv"), ("clip.mp4", b"mp4")]);

    let config = SortConfig::default().with_video_extensions(&["mkv"]);
    run(&SortOptions::new(&zip, &fx.output), &config, &noop).unwrap();

    assert_eq!(tree(&fx.output), vec!["Others/clip.mkv"]);
}

#[test]
fn test_source_errors() {
    let fx = fixture();
    let config = SortConfig::default();

    let missing = run(&SortOptions::new(fx.input.join("nope"), &fx.output), &config, &noop);
    assert!(matches!(missing, Err(BatchError::SourceNotFound { .. })));

    let txt = fx.input.join("list.txt");
    fs::write(&txt, b"not a zip").unwrap();
    let wrong_type = run(&SortOptions::new(&txt, &fx.output), &config, &noop);
    assert!(matches!(wrong_type, Err(BatchError::InvalidSourceType { .. })));

    assert!(!fx.output.exists());
}

#[test]
fn test_directory_without_archives() {
    let fx = fixture();
    fs::write(fx.input.join("photo.jpg"), b"loose file").unwrap();

    let summary = run(
        &SortOptions::new(&fx.input, &fx.output),
        &SortConfig::default(),
        &noop,
    )
    .unwrap();
    assert_eq!(summary.archives_found, 0);
    assert!(tree(&fx.output).is_empty());
}
