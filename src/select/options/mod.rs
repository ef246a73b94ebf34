
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Expected to be a repository full name
    pub value: String,
    pub hidden: bool,
}

/// In-memory model of the target-repository dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSelect {
    options: Vec<SelectOption>,
    selected: Option<usize>,
    /// Visible option indices, best match first
    ranked: Vec<usize>,
}

impl RepoSelect {
    /// All options visible in the given order, first one selected
    #[inline]
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<SelectOption> = values
            .into_iter()
            .map(|value| SelectOption {
                value: value.into(),
                hidden: false,
            })
            .collect();

        Self {
            selected: (!options.is_empty()).then_some(0),
            ranked: (0..options.len()).collect(),
            options,
        }
    }

    #[inline]
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    #[inline]
    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.options.get(index))
            .map(|option| option.value.as_str())
    }

    /// Select `value` if it exists and is visible
    #[inline]
    pub fn select(&mut self, value: &str) -> bool {
        match self
            .options
            .iter()
            .position(|option| option.value == value && !option.hidden)
        {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Visible option values, best match first
    #[inline]
    pub fn visible(&self) -> Vec<&str> {
        self.ranked
            .iter()
            .filter_map(|&index| self.options.get(index))
            .map(|option| option.value.as_str())
            .collect()
    }

    /// Show only options among the first `max_visible` matches (all matches when `None`).
    ///
    /// A hidden selection moves to the first visible option in option order;
    /// with nothing visible the selection is cleared.
    #[inline]
    pub fn apply_matches(&mut self, matches: &[String], max_visible: Option<usize>) {
        let limit = max_visible.unwrap_or(matches.len());

        let mut rank_of: HashMap<&str, usize> = HashMap::with_capacity(limit);
        for (rank, name) in matches.iter().take(limit).enumerate() {
            rank_of.entry(name.as_str()).or_insert(rank);
        }

        for option in &mut self.options {
            option.hidden = !rank_of.contains_key(option.value.as_str());
        }

        let mut ranked: Vec<usize> = (0..self.options.len())
            .filter(|&index| !self.options[index].hidden)
            .collect();
        ranked.sort_by_key(|&index| rank_of.get(self.options[index].value.as_str()).copied());
        self.ranked = ranked;

        let selection_hidden = self
            .selected
            .is_none_or(|index| self.options.get(index).is_none_or(|option| option.hidden));
        if selection_hidden {
            self.selected = self.options.iter().position(|option| !option.hidden);
        }
    }
}
