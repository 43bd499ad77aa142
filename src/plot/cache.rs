use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

use crate::plot::palette::Theme;
use crate::plot::types::PlotSeriesSet;
use crate::session::state::EvaluationPoint;

/// Exact identity of a computed series set.
///
/// The expression text is taken verbatim and coordinates by bit pattern, so
/// `"x^2"` vs `"x^2 "` and `0.0` vs `-0.0` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotKey {
    text: String,
    x0: u64,
    y0: u64,
    theme: Theme,
}

impl PlotKey {
    pub fn new(text: &str, point: EvaluationPoint, theme: Theme) -> Self {
        Self {
            text: text.to_string(),
            x0: point.x().to_bits(),
            y0: point.y().to_bits(),
            theme,
        }
    }
}

/// Memoized series sets for previously plotted inputs.
pub struct PlotCache {
    cache: LruCache<PlotKey, PlotSeriesSet>,
}

impl PlotCache {
    /// `capacity == 0` keeps every entry for the life of the session.
    pub fn new(capacity: usize) -> Self {
        let cache = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self { cache }
    }

    pub fn get(&mut self, key: &PlotKey) -> Option<PlotSeriesSet> {
        let hit = self.cache.get(key).cloned();
        debug!(
            "plot cache {} for '{}'",
            if hit.is_some() { "hit" } else { "miss" },
            key.text
        );
        hit
    }

    pub fn put(&mut self, key: PlotKey, value: PlotSeriesSet) {
        self.cache.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> EvaluationPoint {
        EvaluationPoint::new(x, y).unwrap()
    }

    fn make_set(tag: &str) -> PlotSeriesSet {
        use crate::plot::palette::Rgb;
        use crate::plot::types::{PlotSeries, SeriesData, SeriesKind, SeriesStyle};
        PlotSeriesSet {
            three_d: vec![PlotSeries {
                name: tag.to_string(),
                kind: SeriesKind::Point,
                data: SeriesData::Markers3 {
                    points: vec![(0.0, 0.0, 0.0)],
                },
                visible: true,
                style: SeriesStyle::solid(Rgb(0, 0, 0), 1),
            }],
            two_d: vec![],
        }
    }

    #[test]
    fn test_cache_put_get() {
        let mut cache = PlotCache::new(0);
        let key = PlotKey::new("x^2", point(1.0, 1.0), Theme::Dark);
        cache.put(key.clone(), make_set("a"));
        assert_eq!(cache.get(&key), Some(make_set("a")));
    }

    #[test]
    fn test_cache_miss_on_unused_key() {
        let mut cache = PlotCache::new(0);
        cache.put(PlotKey::new("x^2", point(1.0, 1.0), Theme::Dark), make_set("a"));
        assert!(cache.get(&PlotKey::new("x^2", point(1.0, 2.0), Theme::Dark)).is_none());
        assert!(cache.get(&PlotKey::new("x^2", point(1.0, 1.0), Theme::Light)).is_none());
    }

    #[test]
    fn test_keys_are_not_normalized() {
        let mut cache = PlotCache::new(0);
        cache.put(PlotKey::new("x^2", point(0.0, 0.0), Theme::Dark), make_set("a"));
        assert!(cache.get(&PlotKey::new("x^2 ", point(0.0, 0.0), Theme::Dark)).is_none());
        assert!(cache.get(&PlotKey::new("x^2", point(-0.0, 0.0), Theme::Dark)).is_none());
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut cache = PlotCache::new(0);
        for i in 0..500 {
            cache.put(PlotKey::new("x", point(i as f64, 0.0), Theme::Dark), make_set("a"));
        }
        assert_eq!(cache.len(), 500);
    }

    #[test]
    fn test_cache_lru_eviction() {
        let mut cache = PlotCache::new(2);
        let k1 = PlotKey::new("a", point(0.0, 0.0), Theme::Dark);
        let k2 = PlotKey::new("b", point(0.0, 0.0), Theme::Dark);
        let k3 = PlotKey::new("c", point(0.0, 0.0), Theme::Dark);
        cache.put(k1.clone(), make_set("1"));
        cache.put(k2.clone(), make_set("2"));
        cache.put(k3.clone(), make_set("3"));
        // k1 should have been evicted
        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k2).is_some());
        assert!(cache.get(&k3).is_some());
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = PlotCache::new(4);
        let key = PlotKey::new("x", point(0.0, 0.0), Theme::Dark);
        cache.put(key.clone(), make_set("a"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
