use rand::Rng;
use rand::seq::SliceRandom;

use crate::store::{Entry, Section, SectionRegistry};

/// A question drawn from a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Picked<'a> {
    pub section: &'a Section,
    pub entry: &'a Entry,
}

/// Draw a question uniformly at random from section `key`.
///
/// `None` when the key is unknown or the section has no questions; callers
/// report both the same way. Ratings do not weight the draw.
pub fn pick_question<'a, R: Rng + ?Sized>(
    registry: &'a SectionRegistry,
    key: &str,
    rng: &mut R,
) -> Option<Picked<'a>> {
    let section = registry.get(key)?;
    let entry = section.entries().choose(rng)?;
    Some(Picked { section, entry })
}
