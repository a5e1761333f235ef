//! Shared normalization step every renderer runs exactly once.

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::context::RenderingContext;
use crate::description::Children;
use crate::error::{RenderError, json_kind};
use crate::factory;
use crate::result::RenderingResult;

/// Field-wise override: every `Some` in `self` wins over `defaults`.
pub trait Merge: Sized {
    fn merge(self, defaults: Self) -> Self;
}

/// Settings carry the registration id and the local child scope.
pub trait WidgetSettings: Merge + DeserializeOwned + Default {
    fn id_slot(&mut self) -> &mut Option<String>;
    fn local_children(&self) -> Option<&Children>;
}

/// Implements [`Merge`] for a struct of `Option` fields; the `settings` arm
/// also implements [`WidgetSettings`] over its `id` and `children` fields.
macro_rules! merge_fields {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::normalize::Merge for $ty {
            fn merge(self, defaults: Self) -> Self {
                Self {
                    $($field: self.$field.or(defaults.$field)),+
                }
            }
        }
    };
    (settings $ty:ty { $($field:ident),+ $(,)? }) => {
        $crate::normalize::merge_fields!($ty { id, children, $($field),+ });

        impl $crate::normalize::WidgetSettings for $ty {
            fn id_slot(&mut self) -> &mut Option<String> {
                &mut self.id
            }

            fn local_children(&self) -> Option<&$crate::description::Children> {
                self.children.as_ref()
            }
        }
    };
}
pub(crate) use merge_fields;

#[derive(Debug)]
pub struct Normalized<'a, S, T> {
    pub id: String,
    pub settings: S,
    pub state: T,
    pub context: RenderingContext<'a>,
    pub result: RenderingResult,
}

impl<S: WidgetSettings, T> Normalized<'_, S, T> {
    pub fn local(&self) -> Children {
        self.settings.local_children().cloned().unwrap_or_default()
    }
}

pub fn generate_id() -> String {
    format!("w{}", Uuid::new_v4().simple())
}

/// Merges caller values over the widget defaults, assigns an id when none
/// was given and settles the result and factory the renderer works with.
pub fn normalize<'a, S, T>(
    default_settings: S,
    default_state: T,
    settings: &Value,
    state: &Value,
    context: &RenderingContext<'a>,
    result: Option<RenderingResult>,
    label: &'static str,
) -> Result<Normalized<'a, S, T>, RenderError>
where
    S: WidgetSettings,
    T: Merge + DeserializeOwned + Default,
{
    let given_settings: S = decode(settings, label, "settings")?;
    let given_state: T = decode(state, label, "state")?;

    let mut settings = given_settings.merge(default_settings);
    let state = given_state.merge(default_state);

    let id = settings.id_slot().get_or_insert_with(generate_id).clone();
    let context = context.or_factory(factory::render);
    context.trace(&format!("{label}#{id}"));

    Ok(Normalized {
        id,
        settings,
        state,
        context,
        result: result.unwrap_or_default(),
    })
}

pub(crate) fn decode<V: DeserializeOwned + Default>(
    value: &Value,
    widget: &'static str,
    field: &'static str,
) -> Result<V, RenderError> {
    match value {
        Value::Null => Ok(V::default()),
        Value::Object(_) => V::deserialize(value).map_err(|source| RenderError::Malformed {
            widget,
            field,
            source,
        }),
        other => Err(RenderError::NotAnObject {
            widget,
            field,
            found: json_kind(other),
        }),
    }
}
