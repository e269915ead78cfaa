#[cfg(test)]
mod tests {
    use crate::process::SystemRunner;
    use crate::validate::RefactorValidator;
    use reltools_common::{AppConfig, BaselineProfile, ExtractorKind};
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    // ============================================================================
    // Fixtures: two dist trees compared with the real `diff`
    // ============================================================================

    struct Trees {
        _temp_dir: TempDir,
        old: PathBuf,
        new: PathBuf,
    }

    impl Trees {
        fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let old = temp_dir.path().join("out-old/dist");
            let new = temp_dir.path().join("out-new/dist");
            fs::create_dir_all(&old).expect("Failed to create old tree");
            fs::create_dir_all(&new).expect("Failed to create new tree");
            Self {
                _temp_dir: temp_dir,
                old,
                new,
            }
        }

        /// Write the same file into both trees
        fn both(&self, relative: &str, contents: &str) {
            write_file(&self.old.join(relative), contents);
            write_file(&self.new.join(relative), contents);
        }

        fn config(&self) -> AppConfig {
            AppConfig {
                old_root: self.old.clone(),
                new_root: self.new.clone(),
                extractor: ExtractorKind::Builtin,
                ..AppConfig::default()
            }
        }

        fn report(&self, profiles: &[BaselineProfile]) -> String {
            self.report_with(self.config(), profiles)
        }

        fn report_with(&self, config: AppConfig, profiles: &[BaselineProfile]) -> String {
            RefactorValidator::new(config, Arc::new(SystemRunner::new()))
                .run(profiles)
                .expect("Validation failed")
        }
    }

    fn write_file(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent");
        fs::write(path, contents).expect("Failed to write file");
    }

    fn write_zip<C: AsRef<[u8]>>(path: &Path, files: &[(&str, C)]) {
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent");
        let file = fs::File::create(path).expect("Failed to create file");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, contents) in files {
            zip.start_file(*name, options).expect("Failed to start file");
            zip.write_all(contents.as_ref()).expect("Failed to write");
        }
        zip.finish().expect("Failed to finish ZIP");
    }

    fn pom(artifact: &str) -> String {
        format!(
            "<project>\n  <dependencies>\n    <dependency>\n      <groupId>androidx.collection</groupId>\n      <artifactId>{artifact}</artifactId>\n    </dependency>\n  </dependencies>\n</project>\n"
        )
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[test]
    fn test_identical_trees_give_empty_report() {
        let trees = Trees::new();
        trees.both("androidx/core/core/1.0.0/core-1.0.0.pom", &pom("collection"));
        write_zip(
            &trees.old.join("androidx/core/core/1.0.0/core-1.0.0.jar"),
            &[("androidx/core/Foo.class", "same\n")],
        );
        fs::copy(
            trees.old.join("androidx/core/core/1.0.0/core-1.0.0.jar"),
            trees.new.join("androidx/core/core/1.0.0/core-1.0.0.jar"),
        )
        .expect("Failed to copy jar");

        assert_eq!(trees.report(&[]), "");
    }

    #[test]
    fn test_changed_class_in_jar_is_reported_from_unzipped_tree() {
        let trees = Trees::new();
        let jar = "androidx/core/core/1.0.0/core-1.0.0.jar";
        write_zip(
            &trees.old.join(jar),
            &[("androidx/core/Foo.class", b"\xca\xfe\xba\xbe\x00\x01old")],
        );
        write_zip(
            &trees.new.join(jar),
            &[("androidx/core/Foo.class", b"\xca\xfe\xba\xbe\x00\x02new")],
        );

        let report = trees.report(&[]);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 1, "{report}");
        assert!(lines[0].starts_with("Binary files "), "{report}");
        assert!(
            lines[0].ends_with("core-1.0.0.jar.unzipped/androidx/core/Foo.class differ"),
            "{report}"
        );
        assert!(!report.contains("core-1.0.0.jar "), "{report}");
    }

    #[test]
    fn test_binary_change_is_not_hidden_by_baselined_text_change() {
        let trees = Trees::new();
        let pom_path = "androidx/core/core/1.0.0/core-1.0.0.pom";
        write_file(&trees.old.join(pom_path), &pom("collection"));
        write_file(&trees.new.join(pom_path), &pom("collection-jvm"));
        let jar = "androidx/core/core/1.0.0/core-1.0.0.jar";
        write_zip(&trees.old.join(jar), &[("androidx/core/Foo.class", b"\xca\xfe\xba\xbe\x00\x01")]);
        write_zip(&trees.new.join(jar), &[("androidx/core/Foo.class", b"\xca\xfe\xba\xbe\x00\x02")]);

        let report = trees.report(&[BaselineProfile::AgpKmp]);
        assert!(report.contains("Foo.class differ"), "{report}");
        assert!(!report.contains("collection"), "{report}");
    }

    #[test]
    fn test_changed_source_in_jar_is_reported_as_text() {
        let trees = Trees::new();
        let jar = "androidx/core/core/1.0.0/core-1.0.0-sources.jar";
        write_zip(&trees.old.join(jar), &[("androidx/core/Foo.kt", "old body\n")]);
        write_zip(&trees.new.join(jar), &[("androidx/core/Foo.kt", "new body\n")]);

        let report = trees.report(&[]);

        let headers: Vec<&str> = report.lines().filter(|l| l.starts_with("diff -r")).collect();
        assert_eq!(headers.len(), 1, "{report}");
        assert!(
            headers[0].ends_with("core-1.0.0-sources.jar.unzipped/androidx/core/Foo.kt"),
            "{report}"
        );
        assert!(report.contains("< old body"));
        assert!(report.contains("> new body"));
    }

    #[test]
    fn test_file_added_inside_archive_is_reported() {
        let trees = Trees::new();
        let aar = "androidx/core/core/1.0.0/core-1.0.0.aar";
        write_zip(&trees.old.join(aar), &[("R.txt", "int id foo 0x1\n")]);
        write_zip(
            &trees.new.join(aar),
            &[("R.txt", "int id foo 0x1\n"), ("proguard.txt", "-keep class Foo\n")],
        );

        let report = trees.report(&[]);
        assert!(report.starts_with("Only in "), "{report}");
        assert!(report.ends_with("core-1.0.0.aar.unzipped: proguard.txt"), "{report}");
    }

    #[test]
    fn test_module_checksum_change_is_ignored() {
        let trees = Trees::new();
        let module = "androidx/core/core/1.0.0/core-1.0.0.module";
        let body = |sha: &str| {
            format!(
                "{{\n  \"variants\": [\n    {{\n      \"files\": [\n        {{\n          \"url\": \"core-1.0.0.aar\",\n        \"sha256\": \"{sha}\"\n        }}\n      ]\n    }}\n  ]\n}}\n"
            )
        };
        write_file(&trees.old.join(module), &body("0a0a0a"));
        write_file(&trees.new.join(module), &body("1b1b1b"));

        assert_eq!(trees.report(&[]), "");
    }

    #[test]
    fn test_jvm_suffixed_artifact_is_baselined_for_agp_kmp() {
        let trees = Trees::new();
        let path = "androidx/core/core/1.0.0/core-1.0.0.pom";
        write_file(&trees.old.join(path), &pom("collection"));
        write_file(&trees.new.join(path), &pom("collection-jvm"));

        assert_eq!(trees.report(&[BaselineProfile::AgpKmp]), "");

        // without the profile the same change is reported
        let report = trees.report(&[]);
        assert!(report.starts_with("diff -r "), "{report}");
        assert!(report.contains(">       <artifactId>collection-jvm</artifactId>"), "{report}");
    }

    #[test]
    fn test_missing_bytecode_tool_does_not_fail_the_run() {
        let trees = Trees::new();
        let aar = "androidx/core/core/1.0.0/core-1.0.0.aar";
        write_zip(&trees.old.join(aar), &[("classes.jar", "old classes")]);
        write_zip(&trees.new.join(aar), &[("classes.jar", "new classes")]);

        let config = AppConfig {
            bytecode_diff: true,
            diffuse_path: trees.old.join("no-such-diffuser"),
            ..trees.config()
        };

        assert_eq!(trees.report_with(config, &[]), "");
        assert!(trees
            .new
            .join("androidx/core/core/1.0.0/core-1.0.0.aar.unzipped/classes.jar")
            .is_file());
    }
}
