/// Default pointer travel (in points) before a press becomes a drag.
pub const DEFAULT_TRIGGER_DISTANCE: f32 = 6.0;

const DEFAULT_DEBUG_EVENT_LOG_CAPACITY: usize = 200;

/// Options for [`super::DragDropEngine`].
///
/// With the `serde` feature these (de)serialize with the camelCase keys hosts already use
/// (`triggerDistance`, `cancelOnRightClick`, ...). Deserialization never fails on a bad field:
/// unknown keys are ignored and a value of the wrong type falls back to the field's default.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct DragOptions {
    /// Draggable sources inside the root must match this selector.
    ///
    /// When neither `selector` nor `filter` is set, the root element itself is the source.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub selector: Option<String>,

    /// Presses whose path (up to the root) matches this selector never start a drag.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub filter: Option<String>,

    /// Opaque tag copied onto the session. The engine does not interpret it.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub group: Option<String>,

    /// Pointer distance (in points) from the press position required to start dragging.
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient::trigger_distance")
    )]
    pub trigger_distance: f32,

    /// If true, a secondary-button press while dragging cancels the gesture.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_true"))]
    pub cancel_on_right_click: bool,

    /// Class applied to the source element while it is being dragged.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub dragged_class: Option<String>,

    /// Class applied to the ghost element.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub ghost_class: Option<String>,

    /// Opaque token copied onto every [`super::Draggable`], so drop targets can verify where a
    /// drag came from.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub identifier: Option<String>,

    /// If true, record engine events in a small ring buffer (see
    /// [`super::DragDropEngine::debug_log_text`]).
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lenient::or_default"))]
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "lenient::debug_event_log_capacity")
    )]
    pub debug_event_log_capacity: usize,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            selector: None,
            filter: None,
            group: None,
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            cancel_on_right_click: true,
            dragged_class: None,
            ghost_class: None,
            identifier: None,
            debug_event_log: false,
            debug_event_log_capacity: DEFAULT_DEBUG_EVENT_LOG_CAPACITY,
        }
    }
}

impl DragOptions {
    /// A negative or NaN trigger distance behaves like zero: any movement starts the drag.
    pub(crate) fn effective_trigger_distance(&self) -> f32 {
        self.trigger_distance.max(0.0)
    }
}

#[cfg(feature = "serde")]
mod lenient {
    use serde::{Deserialize, Deserializer, de::IgnoredAny};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OrFallback<T> {
        Value(T),
        Other(IgnoredAny),
    }

    fn or_else<'de, D, T>(deserializer: D, fallback: T) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(match OrFallback::<T>::deserialize(deserializer)? {
            OrFallback::Value(value) => value,
            OrFallback::Other(_) => {
                log::warn!(
                    "ignoring mistyped drag option, expected {}",
                    std::any::type_name::<T>()
                );
                fallback
            }
        })
    }

    pub(super) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        or_else(deserializer, T::default())
    }

    pub(super) fn or_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        or_else(deserializer, true)
    }

    pub(super) fn trigger_distance<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<f32, D::Error> {
        or_else(deserializer, super::DEFAULT_TRIGGER_DISTANCE)
    }

    pub(super) fn debug_event_log_capacity<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<usize, D::Error> {
        or_else(deserializer, super::DEFAULT_DEBUG_EVENT_LOG_CAPACITY)
    }
}
