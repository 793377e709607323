//! Sanitization of inbound chat text before it reaches the engine.

/// Longest message body passed on, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Cleans user text before it is logged, stored or sent to the assistant.
#[derive(Debug, Clone, Default)]
pub struct InboundSanitizer {
    /// Additional markers to strip.
    additional_markers: Vec<String>,
}

impl InboundSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds markers to strip on top of the built-in set.
    pub fn with_additional_markers(mut self, markers: Vec<String>) -> Self {
        self.additional_markers = markers;
        self
    }

    /// # Steps
    /// 1. Remove control characters (newlines kept)
    /// 2. Strip prompt injection markers
    /// 3. Collapse runs of spaces and tabs, trim
    /// 4. Cap length
    pub fn sanitize(&self, input: &str) -> String {
        let cleaned: String = input
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .filter(|c| !c.is_control() || *c == '\n')
            .collect();

        let stripped = self.strip_injection_markers(&cleaned);
        let collapsed = collapse_spaces(&stripped);

        collapsed.trim().chars().take(MAX_MESSAGE_CHARS).collect()
    }

    fn strip_injection_markers(&self, s: &str) -> String {
        let mut result = s.to_string();
        for marker in INJECTION_MARKERS {
            result = result.replace(marker, "");
        }
        for marker in &self.additional_markers {
            result = result.replace(marker.as_str(), "");
        }
        result
    }
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}
