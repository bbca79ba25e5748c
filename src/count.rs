//! Extended-float count with a top-3 contribution summary.
//!
//! A `Count` stores the sum of many small non-negative contributions plus
//! the three largest individual contributions, which downstream discount
//! estimation needs. Merging two counts is an O(1) 6-way selection; the
//! backward pass propagates derivatives through that selection without
//! double-counting ties.

use std::io::{Read, Write};

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Count {
    pub total: f32,
    pub top1: f32,
    pub top2: f32,
    pub top3: f32,
}

/// Consumption record for the top slots of one addition chain's derivative.
///
/// Each post-merge top slot carries one credit; the first summand whose
/// contribution matches the slot's value claims it. One `SlotCredits` is
/// shared across all `add_backward` calls of a chain, so two summands that
/// tied on the same value cannot both claim the same slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCredits {
    used: [bool; 3],
}

impl SlotCredits {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<f32> for Count {
    /// A count with a single elementary contribution `f`.
    fn from(f: f32) -> Self {
        debug_assert!(f >= 0.0);
        Count {
            total: f,
            top1: f,
            top2: 0.0,
            top3: 0.0,
        }
    }
}

impl Count {
    fn top(&self, i: usize) -> f32 {
        match i {
            0 => self.top1,
            1 => self.top2,
            _ => self.top3,
        }
    }

    fn top_mut(&mut self, i: usize) -> &mut f32 {
        match i {
            0 => &mut self.top1,
            1 => &mut self.top2,
            _ => &mut self.top3,
        }
    }

    /// Merge another count into this one.
    ///
    /// The new top slots are the three largest of the six candidates; ties
    /// keep both copies since each slot stands for a distinct elementary
    /// contribution.
    pub fn add(&mut self, other: &Count) {
        self.total += other.total;
        let mut cand = [
            self.top1, self.top2, self.top3, other.top1, other.top2, other.top3,
        ];
        cand.sort_unstable_by(|a, b| b.total_cmp(a));
        self.top1 = cand[0];
        self.top2 = cand[1];
        self.top3 = cand[2];
    }

    /// Add a single elementary contribution. Same result as
    /// `add(&Count::from(f))` without building the temporary.
    pub fn add_value(&mut self, f: f32) {
        debug_assert!(f >= 0.0);
        self.total += f;
        if f > self.top1 {
            self.top3 = self.top2;
            self.top2 = self.top1;
            self.top1 = f;
        } else if f > self.top2 {
            self.top3 = self.top2;
            self.top2 = f;
        } else if f > self.top3 {
            self.top3 = f;
        }
    }

    /// Reverse-mode pass matching a prior `self.add(other)` in a chain
    ///
    ///   let mut c = Count::from(0.0);
    ///   c.add(&c1); c.add(&c2); c.add(&c3);
    ///
    /// Given `this_deriv`, a derivative of some objective w.r.t. `c`, this
    /// accumulates into `other_deriv` a subgradient w.r.t. `other`. The
    /// total component always flows. A top component flows only if `other`'s
    /// slot value was actually selected into `self`'s post-merge top-3:
    /// matching is by value against the first slot whose credit in
    /// `credits` is unclaimed, and claiming a credit zeroes the matching
    /// slot of `this_deriv`. After `add_backward` has run for every summand
    /// of the chain, all three top slots of `this_deriv` are zero.
    pub fn add_backward(
        &self,
        other: &Count,
        this_deriv: &mut Count,
        credits: &mut SlotCredits,
        other_deriv: &mut Count,
    ) {
        other_deriv.total += this_deriv.total;
        let tops = [self.top1, self.top2, self.top3];
        let other_tops = [other.top1, other.top2, other.top3];
        for (j, &val) in other_tops.iter().enumerate() {
            for i in 0..3 {
                if !credits.used[i] && tops[i] == val {
                    credits.used[i] = true;
                    *other_deriv.top_mut(j) += this_deriv.top(i);
                    *this_deriv.top_mut(i) = 0.0;
                    break;
                }
            }
        }
    }

    /// Backward pass matching a prior `self.add_value(f)`.
    pub fn add_value_backward(
        &self,
        f: f32,
        this_deriv: &mut Count,
        credits: &mut SlotCredits,
        other_deriv: &mut Count,
    ) {
        self.add_backward(&Count::from(f), this_deriv, credits, other_deriv);
    }

    /// Componentwise inner product. Only meaningful between
    /// derivative-bearing counts.
    pub fn dot(&self, other: &Count) -> f32 {
        self.total * other.total
            + self.top1 * other.top1
            + self.top2 * other.top2
            + self.top3 * other.top3
    }

    /// Validate the non-derivative invariant
    /// `total >= top1 >= top2 >= top3 >= 0`.
    ///
    /// Do not apply this to counts that represent derivatives; those may
    /// legitimately hold negative components.
    pub fn check(&self) -> Result<(), DataError> {
        let ok = self.total >= self.top1
            && self.top1 >= self.top2
            && self.top2 >= self.top3
            && self.top3 >= 0.0;
        if ok {
            Ok(())
        } else {
            Err(DataError::CountInvariant {
                total: self.total,
                top1: self.top1,
                top2: self.top2,
                top3: self.top3,
            })
        }
    }

    /// Binary encoding: total, top1, top2, top3 as little-endian f32.
    pub fn write_binary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&self.total.to_le_bytes())?;
        out.write_all(&self.top1.to_le_bytes())?;
        out.write_all(&self.top2.to_le_bytes())?;
        out.write_all(&self.top3.to_le_bytes())?;
        Ok(())
    }

    pub fn read_binary<R: Read>(input: &mut R) -> Result<Count, DataError> {
        let mut buf = [0u8; 16];
        input
            .read_exact(&mut buf)
            .map_err(|_| DataError::Corrupt("truncated count".to_string()))?;
        let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let count = Count {
            total: f(0),
            top1: f(4),
            top2: f(8),
            top3: f(12),
        };
        count.check()?;
        Ok(count)
    }

    /// Text encoding: a bare float for single-contribution counts,
    /// `(total,top1,top2,top3)` otherwise.
    pub fn to_text(&self) -> String {
        if self.top1 == self.total && self.top2 == 0.0 && self.top3 == 0.0 {
            format!("{}", self.total)
        } else {
            format!("({},{},{},{})", self.total, self.top1, self.top2, self.top3)
        }
    }

    pub fn parse_text(s: &str) -> Result<Count, DataError> {
        let bad = || DataError::Corrupt(format!("unparseable count '{}'", s));
        let count = if let Some(inner) = s.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            let mut fields = inner.split(',');
            let mut next = || -> Result<f32, DataError> {
                fields
                    .next()
                    .and_then(|p| p.trim().parse::<f32>().ok())
                    .ok_or_else(bad)
            };
            let count = Count {
                total: next()?,
                top1: next()?,
                top2: next()?,
                top3: next()?,
            };
            if fields.next().is_some() {
                return Err(bad());
            }
            count
        } else {
            let f = s.trim().parse::<f32>().map_err(|_| bad())?;
            if f < 0.0 {
                return Err(bad());
            }
            Count::from(f)
        };
        count.check()?;
        Ok(count)
    }
}
