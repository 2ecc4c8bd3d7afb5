//! Script block extraction from Vue SFCs.
//!
//! Only `<script>` and `<script setup>` matter for default mining, so other
//! blocks are skipped over without building descriptors.

use memchr::memchr;
use oxc_span::SourceType;
use vize_carton::FxHashMap;

const TAG_TEMPLATE: &[u8] = b"template";
const TAG_SCRIPT: &[u8] = b"script";
const CLOSING_TEMPLATE: &[u8] = b"</template>";

/// A script block of an SFC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScriptBlock<'a> {
    pub content: &'a str,
    pub lang: Option<&'a str>,
}

impl ScriptBlock<'_> {
    /// Source type used to parse the block.
    pub(crate) fn source_type(&self, force_typed: bool) -> SourceType {
        match self.lang {
            Some("tsx") => SourceType::tsx(),
            Some("jsx") => SourceType::jsx(),
            Some("ts") => SourceType::ts(),
            None if force_typed => SourceType::ts(),
            _ => SourceType::mjs(),
        }
    }
}

/// The script blocks of one SFC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScriptBlocks<'a> {
    pub script: Option<ScriptBlock<'a>>,
    pub script_setup: Option<ScriptBlock<'a>>,
}

/// Split `source` into its script blocks.
///
/// Duplicate blocks keep the first occurrence.
pub(crate) fn split_scripts(source: &str) -> ScriptBlocks<'_> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut blocks = ScriptBlocks::default();
    let mut pos = 0;

    while pos < len {
        let Some(next_lt) = memchr(b'<', &bytes[pos..]) else {
            break;
        };
        pos += next_lt;

        let Some(tag) = parse_open_tag(source, pos) else {
            pos += 1;
            continue;
        };

        let Some((content_end, end_pos)) = find_block_end(source, tag.name, tag.end) else {
            break;
        };

        if tag_name_eq(tag.name.as_bytes(), TAG_SCRIPT) {
            let block = ScriptBlock {
                content: &source[tag.end..content_end],
                lang: tag.attrs.get("lang").copied().filter(|lang| !lang.is_empty()),
            };
            let slot = if tag.attrs.contains_key("setup") {
                &mut blocks.script_setup
            } else {
                &mut blocks.script
            };
            if slot.is_none() {
                *slot = Some(block);
            }
        }

        pos = end_pos;
    }

    blocks
}

struct OpenTag<'a> {
    name: &'a str,
    attrs: FxHashMap<&'a str, &'a str>,
    /// Offset just past `>`.
    end: usize,
}

fn parse_open_tag(source: &str, start: usize) -> Option<OpenTag<'_>> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut pos = start + 1;

    let name_start = pos;
    while pos < len && is_tag_name_char(bytes[pos]) {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = &source[name_start..pos];

    let mut attrs = FxHashMap::default();
    loop {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len {
            return None;
        }
        match bytes[pos] {
            b'>' => return Some(OpenTag { name, attrs, end: pos + 1 }),
            b'/' => {
                pos += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = pos;
        while pos < len && !matches!(bytes[pos], b'=' | b'>' | b'/') && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let attr_name = &source[attr_start..pos];

        let mut value = "";
        if pos < len && bytes[pos] == b'=' {
            pos += 1;
            if pos < len && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                let close = memchr(quote, &bytes[pos..])?;
                pos += close;
                value = &source[value_start..pos];
                pos += 1;
            } else {
                let value_start = pos;
                while pos < len && bytes[pos] != b'>' && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                value = &source[value_start..pos];
            }
        }
        attrs.insert(attr_name, value);
    }
}

/// Returns `(content end, position after the closing tag)`.
fn find_block_end(source: &str, name: &str, content_start: usize) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();

    // Self-closing blocks have no content.
    if content_start >= 2 && bytes[content_start - 2] == b'/' {
        return Some((content_start, content_start));
    }

    if tag_name_eq(name.as_bytes(), TAG_TEMPLATE) {
        return find_template_end(bytes, content_start);
    }

    let closing = format!("</{name}>");
    let closing = closing.as_bytes();
    let mut pos = content_start;
    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        pos += offset;
        if bytes.len() - pos >= closing.len() && bytes[pos..pos + closing.len()].eq_ignore_ascii_case(closing) {
            return Some((pos, pos + closing.len()));
        }
        pos += 1;
    }
    None
}

/// Templates may nest `<template>` tags.
fn find_template_end(bytes: &[u8], content_start: usize) -> Option<(usize, usize)> {
    let mut depth = 1;
    let mut pos = content_start;
    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        pos += offset;
        let rest = &bytes[pos..];
        if rest.len() >= CLOSING_TEMPLATE.len()
            && rest[..CLOSING_TEMPLATE.len()].eq_ignore_ascii_case(CLOSING_TEMPLATE)
        {
            depth -= 1;
            if depth == 0 {
                return Some((pos, pos + CLOSING_TEMPLATE.len()));
            }
            pos += CLOSING_TEMPLATE.len();
            continue;
        }
        let after = 1 + TAG_TEMPLATE.len();
        if rest.len() > after
            && rest[1..after].eq_ignore_ascii_case(TAG_TEMPLATE)
            && (rest[after] == b'>' || rest[after].is_ascii_whitespace())
        {
            let tag_end = memchr(b'>', rest).unwrap_or(rest.len());
            if tag_end == 0 || rest[tag_end - 1] != b'/' {
                depth += 1;
            }
        }
        pos += 1;
    }
    None
}

#[inline(always)]
fn tag_name_eq(name: &[u8], expected: &[u8]) -> bool {
    name.len() == expected.len() && name.eq_ignore_ascii_case(expected)
}

#[inline(always)]
fn is_tag_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_both_scripts() {
        let source = r#"<script lang="ts">
export const helper = 1
</script>
<script setup lang="ts">
const props = defineProps<{ foo: string }>()
</script>
<template><div>{{ foo }}</div></template>
"#;
        let blocks = split_scripts(source);
        let script = blocks.script.unwrap();
        assert_eq!(script.lang, Some("ts"));
        assert!(script.content.contains("export const helper"));
        let setup = blocks.script_setup.unwrap();
        assert!(setup.content.contains("defineProps"));
    }

    #[test]
    fn test_script_inside_template_is_ignored() {
        let source = r#"<template>
  <template v-if="ok"><span /></template>
  <div>&lt;script&gt;</div>
</template>
<script setup>
const a = 1
</script>"#;
        let blocks = split_scripts(source);
        assert!(blocks.script.is_none());
        let setup = blocks.script_setup.unwrap();
        assert_eq!(setup.content.trim(), "const a = 1");
        assert_eq!(setup.lang, None);
    }

    #[test]
    fn test_global_component_source() {
        let blocks = split_scripts(r#"<script setup lang="ts"></script>"#);
        let setup = blocks.script_setup.unwrap();
        assert_eq!(setup.content, "");
    }

    #[test]
    fn test_source_type() {
        let block = ScriptBlock {
            content: "",
            lang: None,
        };
        assert!(!block.source_type(false).is_typescript());
        assert!(block.source_type(true).is_typescript());
        let tsx = ScriptBlock {
            content: "",
            lang: Some("tsx"),
        };
        assert!(tsx.source_type(false).is_jsx());
    }
}
