use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// An installed package the fake `dpkg-query` knows about.
struct FakePackage<'a> {
    pattern: &'a str,
    name: &'a str,
    version: &'a str,
    files: Vec<String>,
}

/// Write a `dpkg-query` stand-in answering `-W` and `-L` for `packages`.
///
/// Every `-L` call is appended to `<dir>/listed`.
fn fake_dpkg_query(dir: &Path, packages: &[FakePackage<'_>]) -> PathBuf {
    let mut show = String::new();
    let mut list = String::new();
    for (i, pkg) in packages.iter().enumerate() {
        let list_file = dir.join(format!("package{}.list", i));
        fs::write(&list_file, pkg.files.join("\n") + "\n").unwrap();

        show.push_str(&format!(
            "  '{}') printf 'ii \\t%s\\t%s\\n' '{}' '{}' ;;\n",
            pkg.pattern, pkg.name, pkg.version
        ));
        list.push_str(&format!(
            "    '{}') cat '{}' ;;\n",
            pkg.name,
            list_file.display()
        ));
    }

    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "-L" ]; then
  echo "$2" >> '{listed}'
  case "$2" in
{list}    *) echo "dpkg-query: package '$2' is not installed" >&2; exit 1 ;;
  esac
  exit 0
fi
case "$3" in
{show}  *) echo "dpkg-query: no packages found matching $3" >&2; exit 1 ;;
esac
"#,
        listed = dir.join("listed").display(),
        list = list,
        show = show,
    );

    let path = dir.join("dpkg-query");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn vendorlink(dpkg_query: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("vendorlink"));
    cmd.env("VENDORLINK_DPKG_QUERY", dpkg_query);
    cmd
}

#[test]
fn test_existing_output_is_usage_error() {
    let out = tempdir().unwrap();
    let before: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert!(before.is_empty());

    vendorlink(Path::new("/nonexistent/dpkg-query"))
        .arg("cuda")
        .arg(out.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_output_is_usage_error() {
    vendorlink(Path::new("/nonexistent/dpkg-query"))
        .arg("mkl-dnn")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_help_exits_successfully() {
    vendorlink(Path::new("/nonexistent/dpkg-query"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mkl-dnn"));
}

#[test]
fn test_missing_package_is_fatal_with_one_error_line() {
    let work = tempdir().unwrap();
    let dpkg_query = fake_dpkg_query(
        work.path(),
        &[FakePackage {
            pattern: "libmkldnn?",
            name: "libmkldnn1",
            version: "1.0.4-1",
            files: vec!["/usr/lib/x86_64-linux-gnu/libmkldnn.so.1".to_string()],
        }],
    );
    let out = work.path().join("mkl-dnn");

    let assert = vendorlink(&dpkg_query)
        .arg("mkl-dnn")
        .arg(&out)
        .assert()
        .code(2);

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    let errors: Vec<&str> = stderr
        .lines()
        .filter(|l| l.starts_with("[vendorlink-mkl-dnn] ERROR"))
        .collect();
    assert_eq!(
        errors,
        vec!["[vendorlink-mkl-dnn] ERROR Required package 'libmkldnn-dev' is not installed"]
    );
    assert!(stderr.contains("[vendorlink-mkl-dnn] INFO Found libmkldnn1 1.0.4-1"));

    // Nothing was listed and nothing was created
    assert!(!work.path().join("listed").exists());
    assert!(!out.exists());
}

#[test]
fn test_cuda_version_is_required_before_anything_else() {
    let work = tempdir().unwrap();
    let dpkg_query = fake_dpkg_query(work.path(), &[]);
    let out = work.path().join("cuda");

    vendorlink(&dpkg_query)
        .arg("cuda")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "[vendorlink-cuda] ERROR Required package 'nvidia-cuda-toolkit' is not installed",
        ));
    assert!(!out.exists());
}

#[test]
fn test_show_layout_prints_json() {
    vendorlink(Path::new("/nonexistent/dpkg-query"))
        .arg("show-layout")
        .arg("cuda")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"libcudnn?\""))
        .stdout(predicate::str::contains("\"versioned-alias\""));
}

#[test]
fn test_build_custom_layout_end_to_end() {
    let work = tempdir().unwrap();
    let usr = work.path().join("usr");
    let lib = usr.join("lib");
    let include = usr.join("include");
    let doc = usr.join("share/doc/libdnn-dev");
    fs::create_dir_all(lib.join("stubs")).unwrap();
    fs::create_dir_all(include.join("dnn")).unwrap();
    fs::create_dir_all(&doc).unwrap();
    fs::write(lib.join("libdnn.so.2.4.1"), b"ELF").unwrap();
    fs::write(lib.join("stubs/libdnn.so"), b"stub").unwrap();
    fs::write(include.join("dnn/dnn.h"), b"header").unwrap();
    fs::write(doc.join("copyright"), b"license").unwrap();

    let s = |p: &Path| p.display().to_string();
    let dpkg_query = fake_dpkg_query(
        work.path(),
        &[
            FakePackage {
                pattern: "libdnn?",
                name: "libdnn2",
                version: "2.4.1-1",
                files: vec![
                    "/.".to_string(),
                    s(&lib),
                    s(&lib.join("libdnn.so.2.4.1")),
                    s(&lib.join("stubs")),
                    s(&lib.join("stubs/libdnn.so")),
                ],
            },
            FakePackage {
                pattern: "libdnn-dev",
                name: "libdnn-dev",
                version: "2.4.1-1",
                files: vec![
                    s(&include.join("dnn")),
                    s(&include.join("dnn/dnn.h")),
                    s(&doc.join("copyright")),
                ],
            },
        ],
    );

    let layout = serde_json::json!({
        "name": "dnn",
        "categories": [
            {
                "name": "libraries",
                "package": "libdnn?",
                "rules": [{"prefix": format!("{}/", s(&lib)), "destination": "lib"}],
                "post": [{
                    "kind": "versioned-alias",
                    "dir": "lib",
                    "link": "libdnn.so.{version}",
                    "target": "libdnn.so.{version}.*.*",
                    "components": 1
                }]
            },
            {
                "name": "headers",
                "package": "libdnn-dev",
                "rules": [{"prefix": format!("{}/", s(&include)), "destination": "include"}],
                "post": [{
                    "kind": "direct",
                    "source": format!("{}/share/doc/{{package}}/copyright", s(&usr)),
                    "dest": "license.txt"
                }]
            }
        ]
    });
    let layout_file = work.path().join("dnn.json");
    fs::write(&layout_file, layout.to_string()).unwrap();

    let out = work.path().join("sdk");
    vendorlink(&dpkg_query)
        .arg("build")
        .arg("--layout")
        .arg(&layout_file)
        .arg(&out)
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("[vendorlink-dnn] DEBUG"))
        .stderr(predicate::str::contains("[vendorlink-dnn] INFO Created 5 symlink(s)"))
        .stderr(predicate::str::contains("impl;").not());

    assert_eq!(
        fs::read_link(out.join("lib/libdnn.so.2.4.1")).unwrap(),
        lib.join("libdnn.so.2.4.1")
    );
    assert_eq!(
        fs::read_link(out.join("lib/stubs/libdnn.so")).unwrap(),
        lib.join("stubs/libdnn.so")
    );
    assert_eq!(
        fs::read_link(out.join("include/dnn/dnn.h")).unwrap(),
        include.join("dnn/dnn.h")
    );
    assert_eq!(
        fs::read_link(out.join("license.txt")).unwrap(),
        doc.join("copyright")
    );

    let alias = out.join("lib/libdnn.so.2");
    assert_eq!(fs::read_link(&alias).unwrap(), PathBuf::from("libdnn.so.2.4.1"));
    assert_eq!(fs::read(&alias).unwrap(), b"ELF");

    // Directories are recreated, never linked
    assert!(!fs::symlink_metadata(out.join("lib/stubs")).unwrap().file_type().is_symlink());
    // The copyright file matches no rule, so it only shows up as license.txt
    assert!(!out.join("include/copyright").exists());
}

#[test]
fn test_build_without_verbose_hides_debug() {
    let work = tempdir().unwrap();
    let dpkg_query = fake_dpkg_query(
        work.path(),
        &[FakePackage {
            pattern: "libfoo1",
            name: "libfoo1",
            version: "1.0-1",
            files: vec!["/usr/lib/libfoo.so.1".to_string()],
        }],
    );
    let layout_file = work.path().join("foo.json");
    fs::write(
        &layout_file,
        r#"{"name": "foo", "categories": [{"name": "libs", "package": "libfoo1",
            "rules": [{"prefix": "/usr/lib/", "destination": "lib"}]}]}"#,
    )
    .unwrap();

    vendorlink(&dpkg_query)
        .arg("build")
        .arg("--layout")
        .arg(&layout_file)
        .arg(work.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("[vendorlink-foo] INFO Created 1 symlink(s)"))
        .stderr(predicate::str::contains("DEBUG").not())
        .stderr(predicate::str::contains("impl;").not())
        .stderr(predicate::str::contains("relink;").not());

    assert_eq!(
        fs::read_link(work.path().join("out/lib/libfoo.so.1")).unwrap(),
        PathBuf::from("/usr/lib/libfoo.so.1")
    );
}

#[test]
fn test_invalid_layout_file_is_fatal() {
    let work = tempdir().unwrap();
    let layout_file = work.path().join("bad.json");
    fs::write(&layout_file, "{}").unwrap();

    vendorlink(Path::new("/nonexistent/dpkg-query"))
        .arg("build")
        .arg("--layout")
        .arg(&layout_file)
        .arg(work.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ERROR Failed to parse layout file"));
    assert!(!work.path().join("out").exists());
}

fn pkg<'a>(pattern: &'a str, name: &'a str, version: &'a str, files: &[&str]) -> FakePackage<'a> {
    FakePackage {
        pattern,
        name,
        version,
        files: files.iter().map(|f| f.to_string()).collect(),
    }
}

// Manifest paths point at the real system locations, so most links dangle.
#[test]
fn test_cuda_layout_end_to_end() {
    let work = tempdir().unwrap();
    let lib = "/usr/lib/x86_64-linux-gnu";
    let dpkg_query = fake_dpkg_query(
        work.path(),
        &[
            pkg(
                "nvidia-cuda-toolkit",
                "nvidia-cuda-toolkit",
                "10.1.243-3",
                &[
                    "/usr/bin/vendorlink-test-nvcc",
                    "/usr/lib/nvidia-cuda-toolkit/libdevice/libdevice.10.bc",
                    "/usr/share/doc/nvidia-cuda-toolkit/changelog.gz",
                ],
            ),
            pkg(
                "libcudart10.1",
                "libcudart10.1",
                "10.1.243-3",
                &["/usr/lib/x86_64-linux-gnu/libcudart.so.10.1.243"],
            ),
            pkg(
                "nvidia-cuda-dev",
                "nvidia-cuda-dev",
                "10.1.243-3",
                &[
                    "/usr/lib/x86_64-linux-gnu/libcudart.so",
                    "/usr/include/vendorlink-test/cuda.h",
                ],
            ),
            pkg(
                "libcupti10.1",
                "libcupti10.1",
                "10.1.243-3",
                &["/usr/lib/x86_64-linux-gnu/libcupti.so.10.1.243"],
            ),
            pkg(
                "libcupti-dev",
                "libcupti-dev",
                "10.1.243-3",
                &["/usr/include/vendorlink-test/cupti.h"],
            ),
            pkg(
                "libcudnn?",
                "libcudnn7",
                "7.6.5.32-1+cuda10.1",
                &["/usr/lib/x86_64-linux-gnu/libcudnn.so.7.6.5"],
            ),
            pkg(
                "libcudnn?-dev",
                "libcudnn7-dev",
                "7.6.5.32-1+cuda10.1",
                &["/usr/include/vendorlink-test/cudnn.h"],
            ),
            pkg(
                "libnvvm?",
                "libnvvm3",
                "10.1.243-3",
                &["/usr/lib/x86_64-linux-gnu/libnvvm.so.3.3.0"],
            ),
        ],
    );
    // Glob metacharacters in the output path must not break the cuDNN alias
    let out = work.path().join("cuda[1]");

    vendorlink(&dpkg_query)
        .arg("cuda")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[vendorlink-cuda] INFO Created 11 symlink(s) (1 fixup(s), 1 manifest entries skipped)",
        ))
        .stderr(predicate::str::contains("DEBUG").not());

    let expected = [
        ("bin/vendorlink-test-nvcc", "/usr/bin/vendorlink-test-nvcc".to_string()),
        (
            "nvvm/libdevice/libdevice.10.bc",
            "/usr/lib/nvidia-cuda-toolkit/libdevice/libdevice.10.bc".to_string(),
        ),
        ("lib64/libcudart.so.10.1.243", format!("{}/libcudart.so.10.1.243", lib)),
        ("lib64/libcudart.so", format!("{}/libcudart.so", lib)),
        ("include/vendorlink-test/cuda.h", "/usr/include/vendorlink-test/cuda.h".to_string()),
        (
            "extras/CUPTI/lib64/libcupti.so.10.1.243",
            format!("{}/libcupti.so.10.1.243", lib),
        ),
        (
            "extras/CUPTI/include/vendorlink-test/cupti.h",
            "/usr/include/vendorlink-test/cupti.h".to_string(),
        ),
        ("lib64/libcudnn.so.7.6.5", format!("{}/libcudnn.so.7.6.5", lib)),
        ("include/vendorlink-test/cudnn.h", "/usr/include/vendorlink-test/cudnn.h".to_string()),
        ("nvvm/lib64/libnvvm.so.3.3.0", format!("{}/libnvvm.so.3.3.0", lib)),
    ];
    for (dest, source) in &expected {
        assert_eq!(
            fs::read_link(out.join(dest)).unwrap(),
            PathBuf::from(source),
            "{}",
            dest
        );
    }
    assert_eq!(
        fs::read_link(out.join("lib64/libcudnn.so.7")).unwrap(),
        PathBuf::from("libcudnn.so.7.6.5")
    );
    assert!(fs::symlink_metadata(out.join("share")).is_err());
}

#[test]
fn test_mkl_dnn_layout_end_to_end() {
    if !Path::new("/usr/share/doc").is_dir() {
        eprintln!("skipping: /usr/share/doc is missing on this host");
        return;
    }
    let work = tempdir().unwrap();

    // The license path comes from the package name; lead it back into the
    // temp dir since /usr/share/doc is not writable here.
    let doc_root = work.path().join("doc");
    let dev_name = format!("../../..{}/libmkldnn-dev", doc_root.display());
    let doc = doc_root.join("libmkldnn-dev");
    fs::create_dir_all(&doc).unwrap();
    fs::write(doc.join("copyright"), b"Apache-2.0").unwrap();

    let dpkg_query = fake_dpkg_query(
        work.path(),
        &[
            pkg(
                "libmkldnn?",
                "libmkldnn0",
                "0.17.2-2",
                &["/usr/lib/x86_64-linux-gnu/libmkldnn.so.0.17.2"],
            ),
            pkg(
                "libmkldnn-dev",
                &dev_name,
                "0.17.2-2",
                &[
                    "/usr/lib/x86_64-linux-gnu/libmkldnn.so",
                    "/usr/include/vendorlink-test/mkldnn.hpp",
                ],
            ),
        ],
    );
    let out = work.path().join("mkl-dnn");

    vendorlink(&dpkg_query)
        .arg("mkl-dnn")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[vendorlink-mkl-dnn] INFO Created 4 symlink(s) (1 fixup(s), 0 manifest entries skipped)",
        ));

    assert_eq!(
        fs::read_link(out.join("lib/libmkldnn.so.0.17.2")).unwrap(),
        PathBuf::from("/usr/lib/x86_64-linux-gnu/libmkldnn.so.0.17.2")
    );
    assert_eq!(
        fs::read_link(out.join("lib/libmkldnn.so")).unwrap(),
        PathBuf::from("/usr/lib/x86_64-linux-gnu/libmkldnn.so")
    );
    assert_eq!(
        fs::read_link(out.join("include/vendorlink-test/mkldnn.hpp")).unwrap(),
        PathBuf::from("/usr/include/vendorlink-test/mkldnn.hpp")
    );
    assert_eq!(fs::read(out.join("license.txt")).unwrap(), b"Apache-2.0");
}
