//! MKL-DNN layout: `lib`, `include` and a top-level `license.txt`.

use super::{Category, ClassificationRule, Layout, PostLink};

pub const NAME: &str = "mkl-dnn";

pub fn layout() -> Layout {
    Layout {
        name: NAME.to_string(),
        versions: vec![],
        categories: vec![
            Category {
                name: "runtime libraries".to_string(),
                package: "libmkldnn?".to_string(),
                rules: vec![ClassificationRule::new("/usr/lib/x86_64-linux-gnu/", "lib")],
                post: vec![],
            },
            Category {
                name: "development files".to_string(),
                package: "libmkldnn-dev".to_string(),
                rules: vec![
                    ClassificationRule::new("/usr/lib/x86_64-linux-gnu/", "lib"),
                    ClassificationRule::new("/usr/include/", "include"),
                ],
                // The copyright file sits under /usr/share/doc, outside every rule prefix
                post: vec![PostLink::Direct {
                    source: "/usr/share/doc/{package}/copyright".to_string(),
                    dest: "license.txt".into(),
                }],
            },
        ],
    }
}
