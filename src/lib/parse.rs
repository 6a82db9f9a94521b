use std::{
  borrow::Cow,
  collections::{HashMap, hash_map},
  fmt,
  sync::LazyLock,
};

use regex::Regex;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const LINE_SEPARATOR: &str = "\n";
const ASSIGNMENT_OPERATOR: &str = "=";

static VARIABLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Z][A-Z_0-9]*)=([^\r\n\x{2028}\x{2029}]*)").expect("regex for variable lines")
});

/// A `.env` style file kept as its raw lines plus an index of the variables found in them.
///
/// Lines that are not variable assignments (comments, blank lines, lowercase keys, anything
/// else) are carried through untouched. Variable lines are only rewritten by [`EnvFile::compile`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvFile<'a> {
  lines: Vec<Cow<'a, str>>,
  vars: HashMap<String, EnvVariable<'a>>,
}

impl<'a> From<&'a str> for EnvFile<'a> {
  fn from(s: &'a str) -> Self {
    let raw: Vec<&'a str> = s.split(LINE_SEPARATOR).collect();

    #[cfg(feature = "tracing")]
    debug!("Parsing env file with {} lines", raw.len());

    let mut vars = HashMap::new();

    for (line_index, &line) in raw.iter().enumerate() {
      let Some(captures) = VARIABLE_LINE.captures(line) else {
        #[cfg(feature = "tracing")]
        trace!("Passthrough line {}: {:?}", line_index, line);
        continue;
      };

      let (Some(name), Some(value)) = (captures.get(1), captures.get(2)) else {
        continue;
      };

      let var = EnvVariable {
        name: name.as_str().to_string(),
        line_index,
        value: Cow::Borrowed(value.as_str()),
      };

      #[cfg(feature = "tracing")]
      trace!("Found variable {} on line {}", var.name, line_index);

      // Last occurrence wins; earlier duplicate lines stay as written.
      if let Some(_previous) = vars.insert(var.name.clone(), var) {
        #[cfg(feature = "tracing")]
        debug!(
          "Duplicate variable {} on line {}, earlier line {} will not be rewritten",
          name.as_str(),
          line_index,
          _previous.line_index
        );
      }
    }

    #[cfg(feature = "tracing")]
    debug!("Parsed {} variables", vars.len());

    let lines = raw.into_iter().map(Cow::Borrowed).collect();

    Self { lines, vars }
  }
}

impl<'a> fmt::Display for EnvFile<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut lines = self.lines.iter();
    if let Some(first) = lines.next() {
      write!(f, "{}", first)?;
    }
    for line in lines {
      write!(f, "{}{}", LINE_SEPARATOR, line)?;
    }
    Ok(())
  }
}

impl<'a> EnvFile<'a> {
  pub fn get(&self, name: &str) -> Option<&EnvVariable<'a>> {
    self.vars.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.vars.contains_key(name)
  }

  /// Iterates over the tracked variables in no particular order.
  pub fn variables(&self) -> hash_map::Values<'_, String, EnvVariable<'a>> {
    self.vars.values()
  }

  /// Number of tracked variables, not lines.
  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn lines(&self) -> &[Cow<'a, str>] {
    &self.lines
  }

  /// Updates the stored value of `name`.
  ///
  /// The line itself is left alone until [`EnvFile::compile`] runs.
  pub fn set_value(
    &mut self,
    name: &str,
    value: impl Into<Cow<'a, str>>,
  ) -> Result<(), EnvFileError> {
    let var = self
      .vars
      .get_mut(name)
      .ok_or_else(|| EnvFileError::UnknownVariable(name.to_string()))?;

    var.value = value.into();

    #[cfg(feature = "tracing")]
    trace!("Set value of {}", name);

    Ok(())
  }

  /// Rewrites every variable line as `NAME=value` from the current values.
  pub fn compile(&mut self) {
    for var in self.vars.values() {
      if let Some(line) = self.lines.get_mut(var.line_index) {
        *line = Cow::Owned(var.to_string());
      }
    }
  }

  /// Joins the lines back into file contents.
  pub fn serialize(&self) -> String {
    self.to_string()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvVariable<'a> {
  pub name: String,
  pub line_index: usize,
  pub value: Cow<'a, str>,
}

impl<'a> fmt::Display for EnvVariable<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.name, ASSIGNMENT_OPERATOR, self.value)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
  #[error("Unknown variable: {0}")]
  UnknownVariable(String),
}
