use std::collections::VecDeque;

/// Iterator extension trait for peekable iterators
pub trait Peek: Iterator
where
    Self: Sized,
{
    /// Create a peekable version of the iterator
    fn n_peekable(self) -> Peekable<Self>;
}

/// Iterator adapter that can look any number of items ahead
#[derive(Debug, Clone)]
pub struct Peekable<I: Iterator> {
    /// Source iterator
    iter: I,

    /// Cached items peeked but not output
    cache: VecDeque<I::Item>,
}

impl<I: Iterator> Peek for I {
    fn n_peekable(self) -> Peekable<Self> {
        Peekable {
            iter: self,
            cache: VecDeque::new(),
        }
    }
}

impl<I: Iterator> Iterator for Peekable<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.cache.pop_front().or_else(|| self.iter.next())
    }
}

impl<I: Iterator> Peekable<I> {
    /// Peek n items ahead of the iterator.  Peek with n == 0 returns the same
    /// item that `iter.next()` would return, but without consuming it.
    pub fn peek(&mut self, n: usize) -> Option<&I::Item> {
        while self.cache.len() <= n {
            self.cache.push_back(self.iter.next()?);
        }

        Some(&self.cache[n])
    }
}

/// Lexical case of an ASN.1 name, which decides what kind of definition a
/// name can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NameCase {
    /// `value`, `object`, `identifier`
    Lower,

    /// `Type`, `ValueSet`, `ObjectSet`, `Module`
    Upper,

    /// `CLASS-NAME`, upper case letters, digits and hyphens only
    Yell,
}

impl NameCase {
    /// Classify a name, ignoring a leading `&` of field references
    pub fn of(name: &str) -> NameCase {
        let name = name.strip_prefix('&').unwrap_or(name);
        let Some(first) = name.chars().next() else {
            return NameCase::Lower;
        };

        if !first.is_uppercase() {
            NameCase::Lower
        } else if name.chars().any(|c| c.is_lowercase()) {
            NameCase::Upper
        } else {
            NameCase::Yell
        }
    }

    /// Starts with an upper case letter
    pub fn is_upper(self) -> bool {
        self != NameCase::Lower
    }
}
