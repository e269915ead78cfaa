//! Known, understood differences between two builds that are suppressed from
//! the refactor report.
//!
//! Single-line noise is a [`BaselineRule::LiteralPrefix`]; it is both passed to
//! `diff -I` and stripped from segments afterwards. Changes that span several
//! lines (a reordered block, a block moved across a `c` range) cannot be skipped
//! by `diff`, so they are erased from the output with multi-line regexes.

use crate::segmenter::DiffSegment;
use crate::tree_diff::DiffFilter;
use regex::Regex;
use reltools_common::BaselineProfile;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

const ADDED: char = '>';
const REMOVED: char = '<';

#[derive(Debug, Clone)]
pub enum BaselineRule {
    /// Drop content lines starting with `text`; a rule without a marker applies
    /// to both added and removed lines.
    LiteralPrefix { marker: Option<char>, text: String },
    /// Erase every match from a file's diff body
    MultilineRegex(Regex),
    /// In files with `extension`, an added line ending in `new_suffix` cancels a
    /// removed line that is identical apart from ending in `old_suffix`.
    SuffixPair {
        extension: String,
        new_suffix: String,
        old_suffix: String,
    },
}

impl BaselineRule {
    /// Parse a literal rule written the way it appears in diff output, e.g.
    /// `>       <type>aar</type>`
    pub fn literal(raw: &str) -> Self {
        match split_marker(raw) {
            Some((marker, text)) => BaselineRule::LiteralPrefix {
                marker: Some(marker),
                text: text.to_string(),
            },
            None => BaselineRule::LiteralPrefix {
                marker: None,
                text: raw.to_string(),
            },
        }
    }

    pub fn suffix_pair(extension: &str, new_suffix: &str, old_suffix: &str) -> Self {
        BaselineRule::SuffixPair {
            extension: extension.to_string(),
            new_suffix: new_suffix.to_string(),
            old_suffix: old_suffix.to_string(),
        }
    }

    fn matches_line(&self, line: &str) -> bool {
        let BaselineRule::LiteralPrefix { marker, text } = self else {
            return false;
        };
        match split_marker(line) {
            Some((line_marker, rest)) => {
                marker.map_or(true, |m| m == line_marker) && rest.starts_with(text.as_str())
            }
            None => marker.is_none() && line.starts_with(text.as_str()),
        }
    }
}

fn split_marker(line: &str) -> Option<(char, &str)> {
    let first = line.chars().next()?;
    if first == ADDED || first == REMOVED {
        Some((first, &line[1..]))
    } else {
        None
    }
}

/// Build a multi-line rule from the lines it must match, anchored at a line start
fn block(lines: &[&str]) -> Regex {
    Regex::new(&format!("(?m)^{}", lines.join("\n"))).unwrap()
}

const AGP_KMP_LITERALS: &[&str] = &[
    // new attributes
    r#">         "org.gradle.libraryelements": "aar","#,
    r#">         "org.gradle.jvm.environment": "android","#,
    r#">         "org.gradle.jvm.environment": "non-jvm","#,
    r#">         "org.gradle.jvm.environment": "standard-jvm","#,
    r#">       <type>aar</type>"#,
    // platform type swap that comes with the attributes above
    r#"<         "org.jetbrains.kotlin.platform.type": "androidJvm""#,
    r#">         "org.jetbrains.kotlin.platform.type": "jvm""#,
    // variant rename; nothing resolves by name
    r#"<      "name": "releaseApiElements-published","#,
    r#">      "name": "androidApiElements-published","#,
    // dackka renders actual typealiases inconsistently
    r#"             <pre>actual typealias"#,
    // upstream sources jars replace the fake-sources ones
    r#"<         "org.gradle.docstype": "fake-sources","#,
    r#">         "org.gradle.docstype": "sources","#,
];

static AGP_KMP_MULTILINE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // stdlib-common exclusions that only worked around a resolution issue
        block(&[
            r#"[0-9]+,[0-9]+c[0-9]+"#,
            r#"<           \},"#,
            r#"<           "excludes": \["#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-stdlib-common""#,
            r#"<             \},"#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-test-common""#,
            r#"<             \},"#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-test-annotations-common""#,
            r#"<             \}"#,
            r#"<           \]"#,
            r#"---"#,
            r#">           \}"#,
        ]),
        block(&[
            r#"[0-9]+,[0-9]+c[0-9]+"#,
            r#"<           "module": "kotlin-stdlib","#,
            r#"<           "excludes": \["#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-stdlib-common""#,
            r#"<             \},"#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-test-common""#,
            r#"<             \},"#,
            r#"<             \{"#,
            r#"<               "group": "org.jetbrains.kotlin","#,
            r#"<               "module": "kotlin-test-annotations-common""#,
            r#"<             \}"#,
            r#"<           \]"#,
            r#"---"#,
            r#">           "module": "kotlin-stdlib""#,
            r#""#,
        ]),
        block(&[
            r#"<       <exclusions>"#,
            r#"<         <exclusion>"#,
            r#"<           <groupId>org.jetbrains.kotlin</groupId>"#,
            r#"<           <artifactId>kotlin-stdlib-common</artifactId>"#,
            r#"<         </exclusion>"#,
            r#"<         <exclusion>"#,
            r#"<           <groupId>org.jetbrains.kotlin</groupId>"#,
            r#"<           <artifactId>kotlin-test-common</artifactId>"#,
            r#"<         </exclusion>"#,
            r#"<         <exclusion>"#,
            r#"<           <groupId>org.jetbrains.kotlin</groupId>"#,
            r#"<           <artifactId>kotlin-test-annotations-common</artifactId>"#,
            r#"<         </exclusion>"#,
            r#"<       </exclusions>"#,
        ]),
        // files[] entries in .module files are unordered; samples-sources moves around
        block(&[
            r#"[0-9]+,[0-9]+d[0-9]+"#,
            r#"<           "name": "[a-z3\-]+-[0-9].[0-9].[0-9](-[a-z0-9]+)?-samples-sources.jar","#,
            r#"<           "url": "[a-z3\-]+-[0-9].[0-9].[0-9](-[a-z0-9]+)?-samples-sources.jar","#,
            r#"<           "size": [0-9]+,"#,
            r#"<           "sha512": "[0-9a-z]+","#,
            r#"<           "sha256": "[0-9a-z]+","#,
            r#"<           "sha1": "[0-9a-z]+","#,
            r#"<           "md5": "[0-9a-z]+""#,
            r#"<         \},"#,
            r#"<         \{"#,
            r#"[0-9]+a[0-9]+,[0-9]+"#,
            r#">         \},"#,
            r#">         \{"#,
            r#">           "name": "[a-z3\-]+-[0-9].[0-9].[0-9](-[a-z0-9]+)?-samples-sources.jar","#,
            r#">           "url": "[a-z3\-]+-[0-9].[0-9].[0-9](-[a-z0-9]+)?-samples-sources.jar","#,
            r#">           "size": [0-9]+,"#,
            r#">           "sha512": "[0-9a-z]+","#,
            r#">           "sha256": "[0-9a-z]+","#,
            r#">           "sha1": "[0-9a-z]+","#,
            r#">           "md5": "[0-9a-z]+""#,
            r#""#,
        ]),
        // the common pom depends on the -jvm one, so this is equivalent
        block(&[
            r#"[0-9]+c[0-9]+"#,
            r#"<       <artifactId>kotlinx-coroutines-core-jvm</artifactId>"#,
            r#"---"#,
            r#">       <artifactId>kotlinx-coroutines-core</artifactId>"#,
        ]),
        // new default androidRelease source set, inert on its own
        block(&[
            r#"(11,17d10|12,18d11)"#,
            r#"<       "name": "androidRelease","#,
            r#"<       "dependencies": \["#,
            r#"<         "commonMain""#,
            r#"<       \],"#,
            r#"<       "analysisPlatform": "jvm""#,
            r#"<     \},"#,
            r#"<     \{"#,
            r#""#,
        ]),
    ]
});

/// Ordered, immutable set of baseline rules for one run
#[derive(Debug, Clone, Default)]
pub struct BaselineRuleSet {
    rules: Vec<BaselineRule>,
    extra_excludes: Vec<String>,
}

impl BaselineRuleSet {
    pub fn new(rules: Vec<BaselineRule>) -> Self {
        Self {
            rules,
            extra_excludes: Vec::new(),
        }
    }

    pub fn for_profiles(profiles: &[BaselineProfile]) -> Self {
        let mut set = Self::default();
        for profile in profiles {
            match profile {
                BaselineProfile::AgpKmp => {
                    set.rules
                        .extend(AGP_KMP_LITERALS.iter().map(|raw| BaselineRule::literal(raw)));
                    set.rules.extend(
                        AGP_KMP_MULTILINE
                            .iter()
                            .cloned()
                            .map(BaselineRule::MultilineRegex),
                    );
                    // -jvm and -android artifactId suffixes in poms
                    set.rules.push(BaselineRule::suffix_pair(
                        "pom",
                        "-jvm</artifactId>",
                        "</artifactId>",
                    ));
                    set.rules.push(BaselineRule::suffix_pair(
                        "pom",
                        "-android</artifactId>",
                        "</artifactId>",
                    ));
                    // agp-kmp may add this empty
                    set.extra_excludes.push(r"**\.aar.unzipped/res".to_string());
                }
            }
        }
        set
    }

    pub fn rules(&self) -> &[BaselineRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Extra `diff -x` globs requested by the profiles
    pub fn extra_excludes(&self) -> impl Iterator<Item = DiffFilter> + '_ {
        self.extra_excludes.iter().map(|glob| DiffFilter::exclude(glob.as_str()))
    }

    /// `diff -I` filters for the literal rules, markers removed
    pub fn ignore_filters(&self) -> impl Iterator<Item = DiffFilter> + '_ {
        self.rules.iter().filter_map(|rule| match rule {
            BaselineRule::LiteralPrefix { text, .. } => {
                Some(DiffFilter::ignore_matching(text.as_str()))
            }
            _ => None,
        })
    }
}

/// Applies a [`BaselineRuleSet`] to diff output
#[derive(Debug, Clone)]
pub struct BaselineFilter {
    rules: BaselineRuleSet,
}

impl BaselineFilter {
    pub fn new(rules: BaselineRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BaselineRuleSet {
        &self.rules
    }

    /// Erase multi-line baselined blocks from a file's diff body.
    ///
    /// Runs before segmenting since some blocks cover two adjacent segments.
    pub fn scrub_multiline<'t>(&self, body: &'t str) -> Cow<'t, str> {
        let mut text = Cow::Borrowed(body);
        for rule in &self.rules.rules {
            if let BaselineRule::MultilineRegex(pattern) = rule {
                if pattern.is_match(&text) {
                    text = Cow::Owned(pattern.replace_all(&text, "").into_owned());
                }
            }
        }
        text
    }

    fn is_literal_baselined(&self, line: &str) -> bool {
        self.rules.rules.iter().any(|rule| rule.matches_line(line))
    }

    fn suffix_pairs<'r>(&'r self, extension: &'r str) -> impl Iterator<Item = (&'r str, &'r str)> {
        self.rules.rules.iter().filter_map(move |rule| match rule {
            BaselineRule::SuffixPair {
                extension: ext,
                new_suffix,
                old_suffix,
            } if ext == extension => Some((new_suffix.as_str(), old_suffix.as_str())),
            _ => None,
        })
    }

    /// Remove baselined lines from one segment.
    ///
    /// Returns `None` when no added or removed line survives, so the report
    /// does not carry bare headers and `---` separators.
    pub fn filter_segment(&self, segment: &DiffSegment, extension: &str) -> Option<DiffSegment> {
        let lines: Vec<&str> = segment
            .lines
            .iter()
            .map(String::as_str)
            .filter(|line| !self.is_literal_baselined(line))
            .collect();

        let mut added = Vec::new();
        let mut removed = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            match split_marker(line) {
                Some((ADDED, text)) => added.push((index, text)),
                Some((REMOVED, text)) => removed.push((index, text)),
                _ => {}
            }
        }

        for (new_suffix, old_suffix) in self.suffix_pairs(extension) {
            cancel_changed_suffixes(&mut added, &mut removed, new_suffix, old_suffix);
        }

        let kept: HashSet<usize> = added
            .iter()
            .chain(removed.iter())
            .map(|(index, _)| *index)
            .collect();
        if kept.is_empty() {
            return None;
        }

        Some(DiffSegment::new(
            lines
                .iter()
                .enumerate()
                .filter(|(index, line)| {
                    !line.is_empty() && (split_marker(line).is_none() || kept.contains(index))
                })
                .map(|(_, line)| line.to_string())
                .collect(),
        ))
    }
}

/// Drop each added line ending in `new_suffix` together with the first unpaired
/// removed line equal to it with the suffix swapped for `old_suffix`.
///
/// `foo-bar` added against `foo` removed, with suffixes `-bar` and `""`, leaves
/// both lists empty.
pub fn cancel_changed_suffixes(
    added: &mut Vec<(usize, &str)>,
    removed: &mut Vec<(usize, &str)>,
    new_suffix: &str,
    old_suffix: &str,
) {
    let mut paired_added = HashSet::new();
    let mut paired_removed = HashSet::new();

    for (a, (_, text)) in added.iter().enumerate() {
        let Some(stem) = text.strip_suffix(new_suffix) else {
            continue;
        };
        let converted = format!("{stem}{old_suffix}");
        let partner = removed
            .iter()
            .enumerate()
            .position(|(r, (_, old))| !paired_removed.contains(&r) && *old == converted);
        if let Some(r) = partner {
            paired_added.insert(a);
            paired_removed.insert(r);
        }
    }

    let mut position = 0;
    added.retain(|_| {
        let keep = !paired_added.contains(&position);
        position += 1;
        keep
    });
    let mut position = 0;
    removed.retain(|_| {
        let keep = !paired_removed.contains(&position);
        position += 1;
        keep
    });
}
