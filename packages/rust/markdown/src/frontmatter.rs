//! Front matter detection.
//!
//! A front matter block is a `---` fence line, any content, and a closing
//! `---` fence line. Only a block at the start of the document counts; the
//! policy decides what may precede the opening fence.

/// What may appear before the opening `---` fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontMatterPolicy {
    /// The fence must be at byte 0.
    #[default]
    Strict,
    /// Whitespace and `<!-- ... -->` comments may precede the fence.
    /// They are removed together with the block.
    LeadingComments,
    /// A run of ASCII digits may precede the fence. Some manual pages carry
    /// such a prefix from an old editing accident; it is removed with the
    /// block and reported through [`FrontMatterSplit::leading`].
    LeadingDigits,
}

/// Result of separating front matter from a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterSplit<'a> {
    /// Text between the fences, without the fence lines.
    pub front_matter: Option<&'a str>,
    /// Everything after the closing fence line, or the whole input when no
    /// block was found.
    pub body: &'a str,
    /// Non-empty text tolerated before the opening fence, if any.
    pub leading: Option<&'a str>,
}

/// Split `text` into front matter and body under `policy`.
///
/// Exactly the leading block (plus any tolerated prefix) is removed. A `---`
/// line further down the document, such as a horizontal rule, is never
/// treated as a fence.
pub fn split_front_matter(text: &str, policy: FrontMatterPolicy) -> FrontMatterSplit<'_> {
    let start = match policy {
        FrontMatterPolicy::Strict => 0,
        FrontMatterPolicy::LeadingComments => skip_comments(text),
        FrontMatterPolicy::LeadingDigits => text
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count(),
    };

    let Some((inner, end)) = fenced_block(&text[start..]) else {
        return FrontMatterSplit {
            front_matter: None,
            body: text,
            leading: None,
        };
    };

    let prefix = &text[..start];
    FrontMatterSplit {
        front_matter: Some(inner),
        body: &text[start + end..],
        leading: (!prefix.trim().is_empty()).then_some(prefix),
    }
}

/// Offset of the first byte that is neither whitespace nor inside a leading
/// HTML comment.
fn skip_comments(text: &str) -> usize {
    let mut pos = 0;
    loop {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();

        if !trimmed.starts_with("<!--") {
            return pos;
        }
        match trimmed.find("-->") {
            Some(close) => pos += close + "-->".len(),
            // Unterminated comment: nothing after it can be a fence.
            None => return pos,
        }
    }
}

/// If `text` opens with a fence line, return the block content and the offset
/// just past the closing fence line.
fn fenced_block(text: &str) -> Option<(&str, usize)> {
    let mut lines = line_spans(text);

    let (first_start, first_end) = lines.next()?;
    if text[first_start..first_end].trim_end() != "---" {
        return None;
    }
    let content_start = next_line_start(text, first_end);

    for (start, end) in lines {
        if text[start..end].trim_end() == "---" {
            let inner = &text[content_start..start];
            return Some((inner, next_line_start(text, end)));
        }
    }
    None
}

/// Byte spans of each line, excluding the `\n`.
fn line_spans(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let span = (offset, offset + line.len());
        offset += line.len() + 1;
        span
    })
}

fn next_line_start(text: &str, line_end: usize) -> usize {
    (line_end + 1).min(text.len())
}
