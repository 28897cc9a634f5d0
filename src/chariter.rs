/*!
  A cursor over the characters of a string slice with one character of
  lookahead, plus the prefix-consuming conveniences the tokenizer wants.
*/

#[derive(Clone, Debug)]
pub struct CharIter<'d> {
  text     :  &'d str,
  position :  usize
}

impl<'d> Iterator for CharIter<'d> {
  type Item = char;

  fn next(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.position += c.len_utf8();
    Some(c)
  }
}

impl<'d> CharIter<'d> {

  pub fn new(text: &'d str) -> Self {
    CharIter {
      text,
      position: 0
    }
  }

  /// Returns the next character without consuming it.
  pub fn peek(&self) -> Option<char> {
    self.data().chars().next()
  }

  pub fn is_empty(&self) -> bool {
    self.peek() == None
  }

  /// Gives the unconsumed remainder of the underlying string slice.
  pub fn data(&self) -> &'d str {
    &self.text[self.position..]
  }

  /// Trims leading whitespace in place.
  pub fn trim_left(&mut self) {
    while let Some(c) = self.peek() {
      if !c.is_whitespace() {
        break;
      }
      self.next();
    }
  }

  /// Consumes the prefix for which each character `c` matches `pred(c)`,
  /// returning the prefix, or `None` if the first character does not match.
  pub fn take_prefix(&mut self, pred: fn(char) -> bool) -> Option<&'d str> {
    let text = self.data();
    let end =
      match text.find(|c: char| !pred(c)) {
        Some(end) => end,
        None => text.len()
      };
    match end {
      0 => None,
      _ => {
        self.position += end;
        Some(&text[..end])
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn peek_and_next() {
    let mut c = CharIter::new("abcd");
    assert_eq!(c.peek(), Some('a'));
    assert_eq!(c.next(), Some('a'));
    assert_eq!(c.next(), Some('b'));
    assert_eq!(c.next(), Some('c'));
    assert_eq!(c.peek(), Some('d'));
    assert_eq!(c.next(), Some('d'));
    assert_eq!(c.next(), None);
    assert_eq!(c.next(), None);
  }

  #[test]
  fn empty_chars() {
    let mut c = CharIter::new("");
    assert!(c.is_empty());
    assert_eq!(c.next(), None);
  }

  #[test]
  fn take_empty_prefix() {
    let mut c = CharIter::new("abcd");
    assert_eq!(c.take_prefix(char::is_uppercase), None);
    assert_eq!(c.data(), "abcd");
  }

  #[test]
  fn trim_whitespace() {
    let mut c = CharIter::new("  \t\n   abcd");
    c.trim_left();
    assert_eq!(c.data(), "abcd");
  }

  #[test]
  fn take_prefix_consumes() {
    let mut c = CharIter::new("ABCDEFGabcd");
    assert_eq!(c.take_prefix(char::is_uppercase), Some("ABCDEFG"));
    assert_eq!(c.next(), Some('a'));
    assert_eq!(c.data(), "bcd");
  }

  #[test]
  fn take_prefix_to_the_end() {
    let mut c = CharIter::new("12345");
    assert_eq!(c.take_prefix(|ch| ch.is_ascii_digit()), Some("12345"));
    assert!(c.is_empty());
  }
}
