//! Presentation sinks.
//!
//! The decoder emits each field as a name, one or more value fragments, and
//! a newline. A sink decides how that looks. Both stock sinks collect into
//! a `String` so a report is only written out once it is complete.

/// Receiver for decoded fields.
pub trait Sink {
    fn emit_name(&mut self, name: &str);

    /// May be called several times per field to build up one line.
    fn emit_value(&mut self, value: &str);

    fn emit_newline(&mut self);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit_name(&mut self, name: &str) {
        (**self).emit_name(name)
    }

    fn emit_value(&mut self, value: &str) {
        (**self).emit_value(value)
    }

    fn emit_newline(&mut self) {
        (**self).emit_newline()
    }
}

/// Width of the name column, separator included.
pub const NAME_COLUMN: usize = 35;

/// Plain text: `name (padded to 32) : value`.
#[derive(Debug, Default)]
pub struct TextSink {
    out: String,
}

impl TextSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Sink for TextSink {
    fn emit_name(&mut self, name: &str) {
        self.out.push_str(&format!("{:<32} : ", name));
    }

    fn emit_value(&mut self, value: &str) {
        self.out.push_str(value);
    }

    fn emit_newline(&mut self) {
        self.out.push('\n');
    }
}

/// HTML: one table row per field.
#[derive(Debug)]
pub struct HtmlSink {
    out: String,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self {
            out: String::from("<table>\n"),
        }
    }

    /// Close the table and return the markup.
    pub fn finish(mut self) -> String {
        self.out.push_str("</table>\n");
        self.out
    }
}

impl Default for HtmlSink {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl Sink for HtmlSink {
    fn emit_name(&mut self, name: &str) {
        self.out.push_str(" <tr>\n");
        self.out
            .push_str(&format!("  <td><b>{}</b></td>\n", escape(name)));
        self.out.push_str("  <td><b>:</b> ");
    }

    fn emit_value(&mut self, value: &str) {
        self.out.push_str(&escape(value));
    }

    fn emit_newline(&mut self) {
        self.out.push_str("  </td>\n");
        self.out.push_str(" </tr>\n");
    }
}
