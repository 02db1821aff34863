use glam::IVec2;
use hecs::Entity;

/// Entity that a distance field radiates from.
///
/// Remembers where it was before the last move so fields can tell whether
/// they need to be regenerated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Source {
    entity: Entity,
    pos: IVec2,
    prev_pos: IVec2,
}

impl Source {
    /// New source with no movement history.
    pub fn new(entity: Entity, pos: IVec2) -> Self {
        Source {
            entity,
            pos,
            prev_pos: pos,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn prev_pos(&self) -> IVec2 {
        self.prev_pos
    }

    /// Record a new position, the current one becomes the previous one.
    ///
    /// Reporting the same position again clears the moved state.
    pub fn move_to(&mut self, pos: IVec2) {
        self.prev_pos = self.pos;
        self.pos = pos;
    }

    pub fn has_moved(&self) -> bool {
        self.pos != self.prev_pos
    }
}

#[cfg(test)]
mod test {
    use glam::ivec2;

    use super::*;

    #[test]
    fn change_detection() {
        let e = hecs::World::new().spawn(());
        let mut s = Source::new(e, ivec2(1, 1));
        assert!(!s.has_moved());

        s.move_to(ivec2(2, 1));
        assert!(s.has_moved());
        assert_eq!(s.prev_pos(), ivec2(1, 1));

        s.move_to(ivec2(2, 1));
        assert!(!s.has_moved());
        assert_eq!(s.pos(), ivec2(2, 1));
    }
}
