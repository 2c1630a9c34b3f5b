//! Language pools of translation groups.

use plume_rdf::{Literal, Term};
use tracing::debug;

use super::FormTree;
use crate::actions::Action;
use crate::error::{ForbiddenReason, PlumeError, Result};
use crate::id::NodeId;
use crate::node::NodeKind;

impl FormTree {
    fn pool_mut(&mut self, group: NodeId) -> Option<&mut Vec<String>> {
        match self.nodes.get_mut(&group).map(|record| &mut record.kind) {
            Some(NodeKind::TranslationGroup(group)) => Some(&mut group.available_languages),
            _ => None,
        }
    }

    fn language_in_use(&self, group: NodeId, language: &str) -> bool {
        self.real_children(group).into_iter().any(|child| {
            self.value_node(child)
                .and_then(|value| value.value_language.as_deref())
                .is_some_and(|used| used == language)
        })
    }

    fn refresh_language_menus(&mut self, group: NodeId) {
        for child in self.real_children(group) {
            self.log(Action::Languages, child);
        }
    }

    /// Give `language` back to the pool of `group`.
    ///
    /// Languages outside the session, already pooled, or still used by
    /// another child are ignored. The pool keeps session order.
    pub(crate) fn language_in(&mut self, group: NodeId, language: &str) {
        if !self.session.knows_language(language) || self.language_in_use(group, language) {
            return;
        }
        let rank = |l: &str| self.session.langlist().iter().position(|s| s == l);
        let new_rank = rank(language);
        let Some(pool) = self.available_languages(group) else {
            return;
        };
        if pool.iter().any(|l| l == language) {
            return;
        }
        let pos = pool
            .iter()
            .position(|l| rank(l) > new_rank)
            .unwrap_or(pool.len());
        let Some(pool) = self.pool_mut(group) else {
            return;
        };
        pool.insert(pos, language.to_owned());
        let size = pool.len();
        self.refresh_language_menus(group);
        if size == 1 {
            if let Some(button) = self.button(group) {
                if self.node(button).is_some_and(|b| !b.is_hidden_m) {
                    self.log(Action::Show, button);
                }
            }
        }
    }

    /// Take `language` out of the pool of `group`.
    pub(crate) fn language_out(&mut self, group: NodeId, language: &str) {
        let Some(pool) = self.pool_mut(group) else {
            return;
        };
        let Some(pos) = pool.iter().position(|l| l == language) else {
            return;
        };
        pool.remove(pos);
        let exhausted = pool.is_empty();
        self.refresh_language_menus(group);
        if exhausted {
            if let Some(button) = self.button(group) {
                self.log(Action::Hide, button);
            }
        }
    }

    /// Languages `id` may switch to: the pool of its translation group
    /// plus its current language first, or every session language
    /// outside translation groups.
    #[must_use]
    pub fn authorized_languages(&self, id: NodeId) -> Vec<String> {
        let current = self
            .value_node(id)
            .and_then(|value| value.value_language.clone());
        let in_translation_group = self
            .parent(id)
            .and_then(|parent| self.node(parent))
            .is_some_and(|parent| matches!(parent.kind, NodeKind::TranslationGroup(_)));
        if !in_translation_group {
            return self.session.langlist().to_vec();
        }
        let mut languages: Vec<String> = current.into_iter().collect();
        if let Some(pool) = self.available_languages(id) {
            for language in pool {
                if !languages.contains(language) {
                    languages.push(language.clone());
                }
            }
        }
        languages
    }

    /// Change the language of a language-string value.
    pub(crate) fn change_language(&mut self, id: NodeId, language: &str) -> Result<()> {
        let Some(value) = self.get(id)?.kind.as_value() else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NotAValue));
        };
        let old = value.value_language.clone();
        if !self.is_lang_string(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NotALanguageString));
        }
        if old.as_deref() == Some(language) {
            return Ok(());
        }
        if self.is_hidden(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::HiddenNode));
        }
        if !self.authorized_languages(id).iter().any(|l| l == language) {
            return Err(PlumeError::forbidden(
                id,
                ForbiddenReason::LanguageNotAuthorized {
                    language: language.to_owned(),
                },
            ));
        }

        if let Some(value) = self.get_mut(id)?.kind.as_value_mut() {
            value.value_language = Some(language.to_owned());
            if let Some(Term::Literal(literal)) = &value.value {
                value.value = Some(Term::Literal(Literal::lang_string(
                    literal.lexical(),
                    language,
                )));
            }
        }
        self.log(Action::Languages, id);

        if let Some(parent) = self.parent(id) {
            if matches!(
                self.node(parent).map(|r| &r.kind),
                Some(NodeKind::TranslationGroup(_))
            ) {
                if let Some(old) = &old {
                    self.language_in(parent, old);
                }
                self.language_out(parent, language);
            }
        }
        debug!(node = id.get(), from = ?old, to = language, "language changed");
        Ok(())
    }
}
