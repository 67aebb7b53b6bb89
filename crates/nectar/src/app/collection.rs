use thiserror::Error;

use super::entity::{Entity, Rect, TickContext};

pub type EntityFactory = Box<dyn FnMut() -> Box<dyn Entity>>;
pub type SurvivalFilter = Box<dyn for<'a> Fn(&dyn Entity, &TickContext<'a>) -> bool>;
pub type CollectionHook = Box<dyn for<'a> FnMut(&mut TickContext<'a>)>;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection has no factory; add() needs one")]
    MissingFactory,
}

/// Ordered group of entities stepped as a unit. Members keep insertion
/// order through stepping and filtering. A collection is itself an
/// `Entity`, so groups nest.
#[derive(Default)]
pub struct Collection {
    members: Vec<Box<dyn Entity>>,
    factory: Option<EntityFactory>,
    filter: Option<SurvivalFilter>,
    draw_hook: Option<CollectionHook>,
    change_hook: Option<CollectionHook>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(mut self, factory: impl FnMut() -> Box<dyn Entity> + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    pub fn with_filter(
        mut self,
        filter: impl for<'a> Fn(&dyn Entity, &TickContext<'a>) -> bool + 'static,
    ) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_draw_hook(mut self, hook: impl for<'a> FnMut(&mut TickContext<'a>) + 'static) -> Self {
        self.draw_hook = Some(Box::new(hook));
        self
    }

    pub fn with_change_hook(
        mut self,
        hook: impl for<'a> FnMut(&mut TickContext<'a>) + 'static,
    ) -> Self {
        self.change_hook = Some(Box::new(hook));
        self
    }

    /// Builds one member through the factory and appends it.
    pub fn add(&mut self) -> Result<(), CollectionError> {
        let factory = self.factory.as_mut().ok_or(CollectionError::MissingFactory)?;
        self.members.push(factory());
        Ok(())
    }

    /// Appends an already-built member, for entities the factory cannot
    /// produce (nested collections, one-offs).
    pub fn push(&mut self, entity: Box<dyn Entity>) {
        self.members.push(entity);
    }

    /// Removes by position. Out of range is a no-op, not a failure.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Entity>> {
        if index < self.members.len() {
            Some(self.members.remove(index))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Box<dyn Entity>] {
        &self.members
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut Box<dyn Entity>> {
        self.members.get_mut(index)
    }

    fn step_members(&mut self, tick: &mut TickContext<'_>) {
        for member in &mut self.members {
            member.step(tick);
        }
    }

    fn filter_members(&mut self, tick: &TickContext<'_>) {
        if let Some(filter) = &self.filter {
            self.members.retain(|member| filter(member.as_ref(), tick));
        }
    }
}

impl Entity for Collection {
    fn rect(&self) -> Rect {
        Rect::ZERO
    }

    fn draw(&mut self, tick: &mut TickContext<'_>) {
        if let Some(hook) = &mut self.draw_hook {
            hook(tick);
        }
    }

    fn change(&mut self, tick: &mut TickContext<'_>) {
        if let Some(hook) = &mut self.change_hook {
            hook(tick);
        }
    }

    /// Members first, then the cull, then the collection's own pair. A
    /// member failing the filter this tick has already drawn once.
    fn step(&mut self, tick: &mut TickContext<'_>) {
        self.step_members(tick);
        self.filter_members(tick);
        self.draw(tick);
        self.change(tick);
    }
}
