//! CUDA toolkit layout.
//!
//! Recreates the `/usr/local/cuda` shape (`lib64`, `include`, `bin`,
//! `extras/CUPTI`, `nvvm`) out of the Debian/Ubuntu `nvidia-cuda-*`,
//! `libcupti*`, `libcudnn*` and `libnvvm*` packages.

use super::{Category, ClassificationRule, Layout, PostLink, VersionSource};

pub const NAME: &str = "cuda";

const LIB: &str = "/usr/lib/x86_64-linux-gnu/";
const INCLUDE: &str = "/usr/include/";

fn category(
    name: &str,
    package: &str,
    rules: Vec<ClassificationRule>,
    post: Vec<PostLink>,
) -> Category {
    Category {
        name: name.to_string(),
        package: package.to_string(),
        rules,
        post,
    }
}

pub fn layout() -> Layout {
    Layout {
        name: NAME.to_string(),
        versions: vec![VersionSource {
            name: "cuda".to_string(),
            package: "nvidia-cuda-toolkit".to_string(),
            components: 2,
        }],
        categories: vec![
            category(
                "runtime libraries",
                "libcudart{cuda}",
                vec![ClassificationRule::new(LIB, "lib64")],
                vec![],
            ),
            category(
                "development libraries and headers",
                "nvidia-cuda-dev",
                vec![
                    ClassificationRule::new(LIB, "lib64"),
                    ClassificationRule::new(INCLUDE, "include"),
                ],
                vec![],
            ),
            category(
                "toolkit binaries and NVVM device libraries",
                "nvidia-cuda-toolkit",
                vec![
                    ClassificationRule::new("/usr/bin/", "bin"),
                    ClassificationRule::new(
                        "/usr/lib/nvidia-cuda-toolkit/libdevice/",
                        "nvvm/libdevice",
                    ),
                ],
                vec![],
            ),
            category(
                "profiling libraries",
                "libcupti{cuda}",
                vec![
                    ClassificationRule::new(LIB, "extras/CUPTI/lib64"),
                    ClassificationRule::new(INCLUDE, "extras/CUPTI/include"),
                ],
                vec![],
            ),
            category(
                "profiling development files",
                "libcupti-dev",
                vec![
                    ClassificationRule::new(LIB, "extras/CUPTI/lib64"),
                    ClassificationRule::new(INCLUDE, "extras/CUPTI/include"),
                ],
                vec![],
            ),
            category(
                "cuDNN libraries",
                "libcudnn?",
                vec![ClassificationRule::new(LIB, "lib64")],
                vec![PostLink::VersionedAlias {
                    dir: "lib64".into(),
                    link: "libcudnn.so.{version}".to_string(),
                    target: "libcudnn.so.{version}.*.*".to_string(),
                    components: 1,
                }],
            ),
            category(
                "cuDNN development headers",
                "libcudnn?-dev",
                vec![ClassificationRule::new(INCLUDE, "include")],
                vec![],
            ),
            category(
                "NVVM compiler backend",
                "libnvvm?",
                vec![ClassificationRule::new(LIB, "nvvm/lib64")],
                vec![],
            ),
        ],
    }
}
