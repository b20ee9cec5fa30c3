use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

/// The guide's top-level views. `Home` is initial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Emergency,
    Find,
    Wifi,
    Rules,
    Checkout,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Home,
        View::Emergency,
        View::Find,
        View::Wifi,
        View::Rules,
        View::Checkout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Emergency => "emergency",
            View::Find => "find",
            View::Wifi => "wifi",
            View::Rules => "rules",
            View::Checkout => "checkout",
        }
    }

    /// Shareable location fragment: `""` for home, `"#<name>"` otherwise.
    pub fn fragment(&self) -> String {
        match self {
            View::Home => String::new(),
            other => format!("#{}", other.name()),
        }
    }

    /// Parse a location fragment, with or without the leading `#`.
    ///
    /// The empty fragment (and `home`) mean the home view. Anything outside
    /// the fixed set yields `None`.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let name = fragment.strip_prefix('#').unwrap_or(fragment);
        if name.is_empty() {
            return Some(View::Home);
        }
        View::ALL.into_iter().find(|v| v.name() == name)
    }

    /// Localized title for headers and menu tiles.
    pub fn title(&self, lang: Lang) -> &'static str {
        match self {
            View::Home => lang.pick("Menu", "Meny"),
            View::Emergency => lang.pick("Emergency", "Nødhjelp"),
            View::Find => lang.pick("Find items", "Hvor er…"),
            View::Wifi => "Wi-Fi",
            View::Rules => lang.pick("House rules", "Regler"),
            View::Checkout => lang.pick("Checkout", "Utsjekk"),
        }
    }

    /// Short hint shown under a menu tile.
    pub fn hint(&self, lang: Lang) -> &'static str {
        match self {
            View::Home => "",
            View::Emergency => lang.pick("Water • power", "Vann • strøm"),
            View::Find => lang.pick("Tools • locations", "Ting • steder"),
            View::Wifi => lang.pick("Network + password", "Nettverk + passord"),
            View::Rules => lang.pick("Read first", "Les først"),
            View::Checkout => lang.pick("Before you leave", "Før du drar"),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything the presentation layer needs to know about where the user is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub view: View,
    pub query: String,
    pub lang: Lang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Explicit user navigation (menu tile, back to menu, emergency shortcut).
    Navigate(View),
    /// The location fragment changed (reload, shared link, back/forward).
    FragmentChanged(String),
    SetQuery(String),
    ClearQuery,
    SetLanguage(Lang),
}

/// Pure transition function.
///
/// Navigation never triggers I/O; an unrecognized fragment leaves the state
/// unchanged.
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();
    match action {
        Action::Navigate(view) => next.view = view,
        Action::FragmentChanged(fragment) => {
            if let Some(view) = View::from_fragment(&fragment) {
                next.view = view;
            }
        }
        Action::SetQuery(query) => next.query = query,
        Action::ClearQuery => next.query.clear(),
        Action::SetLanguage(lang) => next.lang = lang,
    }
    next
}

impl ViewState {
    pub fn new(lang: Lang) -> Self {
        Self {
            lang,
            ..Self::default()
        }
    }

    /// The fragment mirroring this state's view.
    pub fn fragment(&self) -> String {
        self.view.fragment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view_is_home() {
        assert_eq!(ViewState::default().view, View::Home);
    }

    #[test]
    fn test_fragments() {
        assert_eq!(View::Home.fragment(), "");
        assert_eq!(View::Emergency.fragment(), "#emergency");
        assert_eq!(View::Checkout.fragment(), "#checkout");
    }

    #[test]
    fn test_every_view_round_trips_through_its_fragment() {
        for view in View::ALL {
            let state = reduce(&ViewState::default(), Action::Navigate(View::Rules));
            let state = reduce(&state, Action::FragmentChanged(view.fragment()));
            assert_eq!(state.view, view);
        }
    }

    #[test]
    fn test_from_fragment_accepts_bare_names() {
        assert_eq!(View::from_fragment("wifi"), Some(View::Wifi));
        assert_eq!(View::from_fragment("#home"), Some(View::Home));
        assert_eq!(View::from_fragment("#"), Some(View::Home));
    }

    #[test]
    fn test_unknown_fragment_leaves_state_unchanged() {
        let state = reduce(&ViewState::default(), Action::Navigate(View::Find));
        for bad in ["#settings", "#WIFI", "# wifi", "#find/extra"] {
            let next = reduce(&state, Action::FragmentChanged(bad.to_string()));
            assert_eq!(next, state, "fragment {:?}", bad);
        }
    }

    #[test]
    fn test_any_view_can_reach_any_other() {
        for from in View::ALL {
            for to in View::ALL {
                let state = reduce(&ViewState::default(), Action::Navigate(from));
                assert_eq!(reduce(&state, Action::Navigate(to)).view, to);
            }
        }
    }

    #[test]
    fn test_query_and_language_actions() {
        let state = reduce(&ViewState::default(), Action::SetQuery("ket".to_string()));
        assert_eq!(state.query, "ket");
        let state = reduce(&state, Action::SetLanguage(Lang::No));
        assert_eq!(state.lang, Lang::No);
        assert_eq!(state.query, "ket");
        let state = reduce(&state, Action::ClearQuery);
        assert!(state.query.is_empty());
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let state = ViewState::default();
        let _ = reduce(&state, Action::Navigate(View::Wifi));
        assert_eq!(state.view, View::Home);
    }
}
