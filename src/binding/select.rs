//! Control selection
//!
//! Maps a descriptor's kind and style hint onto the control a host should
//! instantiate for it. The crate never renders; the returned kinds are what
//! the host toolkit implements behind the [`Control`](crate::binding::Control)
//! trait.

use crate::error::{ParamBindError, Result};
use crate::mapper::Mapping;
use crate::schema::{Descriptor, Kind};

/// Panel control families a host can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Read-only text display for constant parameters.
    ConstantDisplay,
    CheckBox,
    ToggleButton,
    GraphicToggleButton,
    /// Drop-down list of the allowed values.
    PopupMenu,
    /// Button cycling through the allowed values.
    CyclingButton,
    /// One checkable button per allowed value; `multi` allows several
    /// checked at once.
    ButtonGroup { multi: bool },
    /// Button raising a popup of per-value buttons.
    ButtonMenu,
    Slider,
    LineEdit,
    ColorButton,
}

/// Menu control families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuControlKind {
    /// Submenu with one checkable item per allowed value.
    SelectMenu,
    ToggleMenuItem,
    ColorMenuItem,
    /// Item raising a panel control when activated.
    ControlMenuItem,
}

/// Choose the panel control for a parameter
///
/// The descriptor's own style hint applies unless `style` overrides it.
/// Numeric parameters default to a slider when fully bounded, a text field
/// otherwise.
///
/// # Returns
///
/// The control kind, or a configuration error for an unknown style or a
/// slider request the parameter cannot satisfy.
pub fn choose_control(descriptor: &Descriptor, style: Option<&str>) -> Result<ControlKind> {
    if descriptor.is_constant() {
        return Ok(ControlKind::ConstantDisplay);
    }
    let style = style.or(descriptor.style());

    match descriptor.kind() {
        Kind::SingleSelect => Ok(match style {
            Some("button") => ControlKind::CyclingButton,
            Some("button-group") => ControlKind::ButtonGroup { multi: false },
            Some("button-menu") => ControlKind::ButtonMenu,
            _ => ControlKind::PopupMenu,
        }),
        Kind::MultiSelect => Ok(ControlKind::ButtonGroup { multi: true }),
        Kind::Boolean => Ok(match style {
            Some("button") => ControlKind::ToggleButton,
            Some("graphic-button") => ControlKind::GraphicToggleButton,
            _ => ControlKind::CheckBox,
        }),
        Kind::Integer | Kind::Number => {
            let style = match style {
                None => {
                    if descriptor
                        .bounds()
                        .map(|b| b.is_fully_finite())
                        .unwrap_or(false)
                    {
                        "slider"
                    } else {
                        "text"
                    }
                }
                Some(style) => style,
            };
            match style {
                "slider" => {
                    // Surface unusable slider configurations now, not at
                    // first interaction
                    Mapping::for_descriptor(descriptor)?;
                    Ok(ControlKind::Slider)
                }
                "text" | "edit" => Ok(ControlKind::LineEdit),
                other => Err(ParamBindError::Configuration(format!(
                    "unknown style '{}' for numeric parameter '{}'",
                    other,
                    descriptor.name()
                ))),
            }
        }
        Kind::Color => Ok(ControlKind::ColorButton),
        Kind::String | Kind::List => Ok(ControlKind::LineEdit),
    }
}

/// Choose the menu control for a parameter
///
/// # Returns
///
/// The menu control kind; constant parameters have no menu control.
pub fn choose_menu_control(descriptor: &Descriptor) -> Result<MenuControlKind> {
    if descriptor.is_constant() {
        return Err(ParamBindError::Configuration(format!(
            "no menu control for constant parameter '{}'",
            descriptor.name()
        )));
    }
    Ok(match descriptor.kind() {
        Kind::SingleSelect => MenuControlKind::SelectMenu,
        Kind::Boolean => MenuControlKind::ToggleMenuItem,
        Kind::Color => MenuControlKind::ColorMenuItem,
        _ => MenuControlKind::ControlMenuItem,
    })
}
