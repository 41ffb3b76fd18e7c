//! Utility overlays and their per-renderer render options.

use std::collections::HashMap;

use glance_core::{GlanceError, RenderOption, Result, SharedGeometry};
use glance_render::{GeometryRenderer, RendererId};

/// Render options bound to individual utility renderers.
///
/// Renderers without an entry use the global option. Keys are always a
/// subset of the live utility renderers.
#[derive(Debug, Default, Clone)]
pub struct RenderOptionsMap {
    options: HashMap<RendererId, RenderOption>,
}

impl RenderOptionsMap {
    /// Binds `option` to `renderer`, replacing any previous binding.
    pub fn bind(&mut self, renderer: RendererId, option: RenderOption) {
        self.options.insert(renderer, option);
    }

    /// Returns the option bound to `renderer`, or `global` if none is.
    pub fn lookup<'a>(&'a self, renderer: RendererId, global: &'a RenderOption) -> &'a RenderOption {
        self.options.get(&renderer).unwrap_or(global)
    }

    /// Returns the option bound to `renderer`.
    pub fn get(&self, renderer: RendererId) -> Option<&RenderOption> {
        self.options.get(&renderer)
    }

    /// Drops the binding of `renderer`.
    pub fn unbind(&mut self, renderer: RendererId) -> Option<RenderOption> {
        self.options.remove(&renderer)
    }

    /// Returns true if `renderer` has its own option.
    pub fn contains(&self, renderer: RendererId) -> bool {
        self.options.contains_key(&renderer)
    }

    /// Returns the renderers with a binding.
    pub fn renderers(&self) -> impl Iterator<Item = RendererId> + '_ {
        self.options.keys().copied()
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn clear(&mut self) {
        self.options.clear();
    }
}

/// A utility geometry, its renderer, and whether it may be removed.
pub(crate) struct Utility {
    pub geometry: SharedGeometry,
    pub renderer: Box<dyn GeometryRenderer>,
    pub permanent: bool,
}

/// Utilities in insertion order plus their option bindings.
#[derive(Default)]
pub(crate) struct UtilityList {
    entries: Vec<Utility>,
    options: RenderOptionsMap,
}

impl UtilityList {
    pub fn push(&mut self, utility: Utility, option: Option<RenderOption>) -> RendererId {
        let id = utility.renderer.id();
        if let Some(option) = option {
            self.options.bind(id, option);
        }
        self.entries.push(utility);
        id
    }

    /// Removes a non-permanent utility and its binding.
    pub fn remove(&mut self, id: RendererId) -> Result<Utility> {
        let index = self.index_of(id)?;
        if self.entries[index].permanent {
            return Err(GlanceError::PermanentUtility(id.get()));
        }
        self.options.unbind(id);
        Ok(self.entries.remove(index))
    }

    /// Removes every utility, permanent ones included, with their bindings.
    pub fn clear(&mut self) -> Vec<Utility> {
        self.options.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn get(&self, id: RendererId) -> Option<&Utility> {
        self.entries.iter().find(|u| u.renderer.id() == id)
    }

    pub fn get_mut(&mut self, id: RendererId) -> Option<&mut Utility> {
        self.entries.iter_mut().find(|u| u.renderer.id() == id)
    }

    pub fn contains(&self, id: RendererId) -> bool {
        self.entries.iter().any(|u| u.renderer.id() == id)
    }

    pub fn bind_option(&mut self, id: RendererId, option: RenderOption) -> Result<()> {
        self.index_of(id)?;
        self.options.bind(id, option);
        Ok(())
    }

    pub fn options(&self) -> &RenderOptionsMap {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Visits utilities in insertion order with the option each one renders with.
    pub fn for_each_with_option(
        &mut self,
        global: &RenderOption,
        mut visit: impl FnMut(&mut Utility, &RenderOption),
    ) {
        let Self { entries, options } = self;
        for utility in entries.iter_mut() {
            let option = options.lookup(utility.renderer.id(), global);
            visit(utility, option);
        }
    }

    fn index_of(&self, id: RendererId) -> Result<usize> {
        self.entries
            .iter()
            .position(|u| u.renderer.id() == id)
            .ok_or(GlanceError::UtilityNotFound(id.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::{share, Vec3};
    use glance_geometry::LineSet;
    use glance_render::create_renderer;

    fn utility(permanent: bool) -> Utility {
        let geometry: SharedGeometry = share(LineSet::new(vec![Vec3::ZERO, Vec3::X], vec![[0, 1]]));
        let mut renderer = create_renderer(&geometry).unwrap();
        assert!(renderer.initialize(&geometry));
        Utility {
            geometry,
            renderer,
            permanent,
        }
    }

    fn keys_are_live(list: &UtilityList) -> bool {
        list.options().renderers().all(|id| list.contains(id))
    }

    #[test]
    fn test_lookup_falls_back_to_global() {
        let mut list = UtilityList::default();
        let global = RenderOption::default();
        let plain = list.push(utility(false), None);
        let custom_option = RenderOption {
            point_size: 11.0,
            ..RenderOption::default()
        };
        let custom = list.push(utility(false), Some(custom_option));

        assert_eq!(list.options().lookup(plain, &global).point_size, global.point_size);
        assert_eq!(list.options().lookup(custom, &global).point_size, 11.0);
        assert!(list.options().get(plain).is_none());
        assert_eq!(list.options().get(custom).map(|o| o.point_size), Some(11.0));
        assert_eq!(list.options().len(), 1);
    }

    #[test]
    fn test_remove_prunes_binding() {
        let mut list = UtilityList::default();
        let id = list.push(utility(false), Some(RenderOption::default()));
        assert!(list.options().contains(id));
        list.remove(id).unwrap();
        assert!(list.options().is_empty());
        assert!(matches!(list.remove(id), Err(GlanceError::UtilityNotFound(_))));
    }

    #[test]
    fn test_permanent_utility_stays() {
        let mut list = UtilityList::default();
        let id = list.push(utility(true), Some(RenderOption::default()));
        assert!(matches!(list.remove(id), Err(GlanceError::PermanentUtility(_))));
        assert_eq!(list.len(), 1);
        assert!(keys_are_live(&list));

        assert_eq!(list.clear().len(), 1);
        assert!(list.options().is_empty());
    }

    #[test]
    fn test_bind_requires_live_utility() {
        let mut list = UtilityList::default();
        let id = list.push(utility(false), None);
        list.bind_option(id, RenderOption::default()).unwrap();
        list.remove(id).unwrap();
        assert!(list.bind_option(id, RenderOption::default()).is_err());
        assert!(keys_are_live(&list));
    }

    #[test]
    fn test_visit_in_insertion_order() {
        let mut list = UtilityList::default();
        let ids: Vec<_> = (0..3).map(|_| list.push(utility(false), None)).collect();
        let mut seen = Vec::new();
        list.for_each_with_option(&RenderOption::default(), |u, _| seen.push(u.renderer.id()));
        assert_eq!(seen, ids);
    }
}
