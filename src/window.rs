// context windows around one token position of one document.
//
// a document is treated as a ring: window positions that run past either
// edge wrap around modulo the document length. The counter only hands over
// documents longer than 2L+1, so the 2L positions around the center never
// collide with each other or with the center.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::error::PpmiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Weighting {
    /// every position in a fixed 2L window gets weight 1.
    #[default]
    Unweighted,
    /// GloVe style, weights grow linearly toward the center: for L = 2, [1/2, 1, -, 1, 1/2].
    Distance,
    /// word2vec style, the left radius is drawn from U(1, L) per token and the
    /// weights run the other way: for L = 2, [1, 1/2, -, 1/2, 1].
    Variable,
}

impl Weighting {

    /// Weighted context of `tokens[pos]`, keyed by context token. The center
    /// position itself is never part of the window. When a token occurs at
    /// more than one window position, the rightmost occurrence sets its weight.
    ///
    /// `rng` is only drawn from by `Weighting::Variable`. A zero half window or
    /// a position outside `tokens` yields an empty context.
    pub fn context<'a, R: Rng>(&self,
        tokens: &[&'a str],
        pos: usize,
        half_window: usize,
        rng: &mut R) -> HashMap<&'a str, f64> {

        let l = half_window;
        if l == 0 || pos >= tokens.len() {
            return HashMap::new()
        }
        let (left, weights) = match self {
            Weighting::Unweighted => (l, vec![1.0; 2 * l]),
            Weighting::Distance => {
                let rising = Weighting::rising(l);
                let falling = rising.iter().rev().copied();
                (l, rising.iter().copied().chain(falling).collect())
            },
            Weighting::Variable => {
                let left = rng.gen_range(1..=l);
                let rising = Weighting::rising(l);
                let profile = rising.iter().rev().chain(rising.iter()).copied();
                (left, profile.take(left + l).collect())
            }
        };

        Weighting::positions(tokens.len(), pos, left, l)
            .zip(weights)
            .map(|(i, w)| (tokens[i], w))
            .collect()
    }

    // [1/L, 2/L, ..., L/L]
    fn rising(half_window: usize) -> Vec<f64> {
        let l = half_window as f64;
        (1..=half_window).map(|i| i as f64 / l).collect()
    }

    // far-left to far-right, both bounds wrapped explicitly modulo n
    fn positions(n: usize, pos: usize, left: usize, right: usize) -> impl Iterator<Item = usize> {
        let n = n as i64;
        let pos = pos as i64;
        (pos - left as i64..pos)
            .chain(pos + 1..=pos + right as i64)
            .map(move |x| x.rem_euclid(n) as usize)
    }
}

impl FromStr for Weighting {
    type Err = PpmiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unweighted" => Ok(Weighting::Unweighted),
            "glove" | "distance-weighted" => Ok(Weighting::Distance),
            "word2vec" | "variable-window" => Ok(Weighting::Variable),
            other => Err(PpmiError::Config(format!(
                "unknown weighting '{}', expected one of unweighted, glove, word2vec", other
            )))
        }
    }
}

impl Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Weighting::Unweighted => "unweighted",
            Weighting::Distance => "glove",
            Weighting::Variable => "word2vec",
        };
        f.write_str(name)
    }
}

impl Serialize for Weighting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


#[cfg(test)]
mod tests {

    use std::collections::HashMap;
    use rand::{rngs::StdRng, SeedableRng};
    use super::Weighting;

    const DOC: [&str; 7] = ["a", "b", "c", "d", "e", "f", "g"];

    fn golden(pairs: &[(&'static str, f64)]) -> HashMap<&'static str, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn unweighted_wraps_both_edges() {
        let mut rng = StdRng::seed_from_u64(0);

        let first = Weighting::Unweighted.context(&DOC, 0, 2, &mut rng);
        assert_eq!(first, golden(&[("f", 1.0), ("g", 1.0), ("b", 1.0), ("c", 1.0)]));

        let last = Weighting::Unweighted.context(&DOC, 6, 2, &mut rng);
        assert_eq!(last, golden(&[("e", 1.0), ("f", 1.0), ("a", 1.0), ("b", 1.0)]));
    }

    #[test]
    fn distance_profile_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(0);

        let ctx = Weighting::Distance.context(&DOC, 3, 2, &mut rng);
        assert_eq!(ctx, golden(&[("b", 0.5), ("c", 1.0), ("e", 1.0), ("f", 0.5)]));

        // L = 3 around position 1 wraps on the left
        let ctx = Weighting::Distance.context(&DOC, 1, 3, &mut rng);
        assert_eq!(ctx, golden(&[
            ("f", 1.0 / 3.0), ("g", 2.0 / 3.0), ("a", 1.0),
            ("c", 1.0), ("d", 2.0 / 3.0), ("e", 1.0 / 3.0)
        ]));
    }

    #[test]
    fn variable_window_with_unit_radius() {
        // with L = 1 the sampled radius is always 1: weights [1, -, 1]
        let mut rng = StdRng::seed_from_u64(3);
        for pos in 0..DOC.len() {
            let ctx = Weighting::Variable.context(&DOC, pos, 1, &mut rng);
            assert_eq!(ctx.len(), 2);
            assert!(ctx.values().all(|w| *w == 1.0));
        }
    }

    #[test]
    fn variable_window_profile() {
        // L = 2: radius 2 gives [1, 1/2, -, 1/2, 1], radius 1 gives [1, -, 1/2, 1/2]
        let full = golden(&[("b", 1.0), ("c", 0.5), ("e", 0.5), ("f", 1.0)]);
        let short = golden(&[("c", 1.0), ("e", 0.5), ("f", 0.5)]);

        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = (false, false);
        for _ in 0..64 {
            let ctx = Weighting::Variable.context(&DOC, 3, 2, &mut rng);
            if ctx == full {
                seen.0 = true;
            } else if ctx == short {
                seen.1 = true;
            } else {
                panic!("unexpected window {:?}", ctx);
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn variable_window_is_reproducible_with_a_seed() {
        let draw = |seed: u64| -> Vec<HashMap<&'static str, f64>> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..DOC.len()).map(|pos| Weighting::Variable.context(&DOC, pos, 3, &mut rng)).collect()
        };
        assert_eq!(draw(42), draw(42));
    }

    #[test]
    fn center_position_never_in_window() {
        // all tokens distinct, so the center token string stands for its position
        let mut rng = StdRng::seed_from_u64(5);
        for weighting in [Weighting::Unweighted, Weighting::Distance, Weighting::Variable] {
            for l in 1..=3 {
                for pos in 0..DOC.len() {
                    let ctx = weighting.context(&DOC, pos, l, &mut rng);
                    assert!(!ctx.contains_key(DOC[pos]), "{} L={} pos={}", weighting, l, pos);
                    assert!(ctx.values().all(|w| *w > 0.0));
                }
            }
        }
    }

    #[test]
    fn repeated_token_keeps_rightmost_weight() {
        let doc = ["x", "y", "z", "y", "w", "v"];
        let mut rng = StdRng::seed_from_u64(0);
        // around "z" with L = 2: x:1/2, y:1, y:1, w:1/2
        let ctx = Weighting::Distance.context(&doc, 2, 2, &mut rng);
        assert_eq!(ctx, golden(&[("x", 0.5), ("y", 1.0), ("w", 0.5)]));
    }

    #[test]
    fn empty_window_or_document_gives_no_context() {
        let mut rng = StdRng::seed_from_u64(0);
        for weighting in [Weighting::Unweighted, Weighting::Distance, Weighting::Variable] {
            assert!(weighting.context(&DOC, 3, 0, &mut rng).is_empty());
            assert!(weighting.context(&[], 0, 2, &mut rng).is_empty());
            assert!(weighting.context(&DOC, DOC.len(), 2, &mut rng).is_empty());
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("glove".parse::<Weighting>().unwrap(), Weighting::Distance);
        assert_eq!("variable-window".parse::<Weighting>().unwrap(), Weighting::Variable);
        assert_eq!("unweighted".parse::<Weighting>().unwrap(), Weighting::Unweighted);
        assert!("cbow".parse::<Weighting>().is_err());
    }
}
