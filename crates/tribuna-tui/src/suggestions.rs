//! Suggested questions shown while the transcript is empty.

/// A topic grouping two ready-made questions.
pub struct Topic {
    pub title: &'static str,
    pub questions: [&'static str; 2],
}

/// Topics and questions offered on the empty transcript.
pub const TOPICS: &[Topic] = &[
    Topic {
        title: "Vivienda",
        questions: [
            "¿Qué partidos proponen aumentar la oferta de vivienda social?",
            "¿Qué medidas se proponen para mejorar el acceso a la vivienda?",
        ],
    },
    Topic {
        title: "Empleo",
        questions: [
            "¿Qué políticas hay para mejorar la calidad del empleo?",
            "¿Qué propuestas tienen para fomentar el emprendimiento?",
        ],
    },
    Topic {
        title: "Sanidad",
        questions: [
            "¿Qué planes tienen los partidos para reducir las listas de espera en hospitales?",
            "¿Qué partidos apuestan por reforzar la sanidad pública?",
        ],
    },
    Topic {
        title: "Fiscalidad",
        questions: [
            "¿Qué partidos proponen subir o bajar impuestos?",
            "¿Cómo planean financiar el gasto público?",
        ],
    },
    Topic {
        title: "Medio Ambiente",
        questions: [
            "¿Qué medidas hay para combatir el cambio climático?",
            "¿Cómo se planea impulsar las energías renovables?",
        ],
    },
    Topic {
        title: "Educación",
        questions: [
            "¿Qué cambios proponen en el sistema educativo?",
            "¿Qué partidos apoyan la educación gratuita en universidades?",
        ],
    },
];

/// Total number of selectable questions.
pub fn question_count() -> usize {
    TOPICS.len() * 2
}

/// Returns the question at a flat index across all topics.
pub fn question_at(index: usize) -> Option<&'static str> {
    let topic = TOPICS.get(index / 2)?;
    Some(topic.questions[index % 2])
}

/// Selection cursor over the flattened question list.
#[derive(Debug, Default)]
pub struct SuggestionState {
    selected: Option<usize>,
}

impl SuggestionState {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_question(&self) -> Option<&'static str> {
        self.selected.and_then(question_at)
    }

    pub fn select_next(&mut self) {
        self.selected = Some(match self.selected {
            Some(index) if index + 1 < question_count() => index + 1,
            Some(index) => index,
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        self.selected = Some(match self.selected {
            Some(index) => index.saturating_sub(1),
            None => 0,
        });
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_indexing_covers_all_topics() {
        assert_eq!(question_count(), 12);
        assert_eq!(
            question_at(0),
            Some("¿Qué partidos proponen aumentar la oferta de vivienda social?")
        );
        assert_eq!(
            question_at(11),
            Some("¿Qué partidos apoyan la educación gratuita en universidades?")
        );
        assert_eq!(question_at(12), None);
    }

    #[test]
    fn test_selection_clamps_at_ends() {
        let mut selection = SuggestionState::default();
        selection.select_previous();
        assert_eq!(selection.selected(), Some(0));
        selection.select_previous();
        assert_eq!(selection.selected(), Some(0));

        for _ in 0..20 {
            selection.select_next();
        }
        assert_eq!(selection.selected(), Some(question_count() - 1));
    }
}
