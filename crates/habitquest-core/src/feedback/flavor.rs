use crate::events::GamificationEvent;
use crate::model::Theme;

/// Resolved look and voice of one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Studies,
    Exercise,
    Sleep,
    Nutrition,
    Neutral,
    LevelUp,
}

impl Flavor {
    pub fn for_theme(theme: Option<Theme>) -> Self {
        match theme {
            Some(Theme::Studies) => Flavor::Studies,
            Some(Theme::Exercise) => Flavor::Exercise,
            Some(Theme::Sleep) => Flavor::Sleep,
            Some(Theme::Nutrition) => Flavor::Nutrition,
            _ => Flavor::Neutral,
        }
    }

    /// Theme lookup first, then the level-up override, which always wins.
    pub fn resolve(event: &GamificationEvent) -> Self {
        let themed = Self::for_theme(event.theme);
        match (event.leveled_up, event.new_level) {
            (true, Some(_)) => Flavor::LevelUp,
            _ => themed,
        }
    }

    pub fn mascot_key(self) -> &'static str {
        match self {
            Flavor::Studies => "mascot-studies",
            Flavor::Exercise => "mascot-exercise",
            Flavor::Sleep => "mascot-sleep",
            Flavor::Nutrition => "mascot-nutrition",
            Flavor::Neutral => "mascot-neutral",
            Flavor::LevelUp => "mascot-level-up",
        }
    }

    pub fn message(self, event: &GamificationEvent) -> String {
        let xp = event.xp_awarded;
        match self {
            Flavor::Studies => format!("Brain gains! +{xp} XP for hitting the books."),
            Flavor::Exercise => format!("Strong work! +{xp} XP earned."),
            Flavor::Sleep => format!("Well rested, well earned: +{xp} XP."),
            Flavor::Nutrition => format!("Fuel for the quest! +{xp} XP."),
            Flavor::Neutral if xp == 0 => "Nice work!".to_string(),
            Flavor::Neutral => format!("Nice work! +{xp} XP."),
            Flavor::LevelUp => match event.new_level {
                Some(level) => format!("Level up! You reached level {level} (+{xp} XP)."),
                None => format!("Level up! +{xp} XP."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::GamificationKind;

    fn event(theme: Option<Theme>, leveled_up: bool) -> GamificationEvent {
        GamificationEvent {
            kind: GamificationKind::HabitCompleted,
            theme,
            xp_awarded: 40,
            leveled_up,
            new_level: leveled_up.then_some(3),
        }
    }

    #[test]
    fn each_theme_has_its_mascot() {
        let cases = [
            (Theme::Studies, "mascot-studies"),
            (Theme::Exercise, "mascot-exercise"),
            (Theme::Sleep, "mascot-sleep"),
            (Theme::Nutrition, "mascot-nutrition"),
            (Theme::Unknown, "mascot-neutral"),
        ];
        for (theme, key) in cases {
            assert_eq!(Flavor::resolve(&event(Some(theme), false)).mascot_key(), key);
        }
    }

    #[test]
    fn focus_without_theme_is_neutral() {
        let mut ev = event(None, false);
        ev.kind = GamificationKind::FocusCompleted;
        let flavor = Flavor::resolve(&ev);
        assert_eq!(flavor, Flavor::Neutral);
        assert_eq!(flavor.message(&ev), "Nice work! +40 XP.");

        ev.xp_awarded = 0;
        assert_eq!(flavor.message(&ev), "Nice work!");
    }

    #[test]
    fn level_up_overrides_every_theme() {
        for theme in [Some(Theme::Sleep), Some(Theme::Studies), None] {
            let ev = event(theme, true);
            let flavor = Flavor::resolve(&ev);
            assert_eq!(flavor, Flavor::LevelUp);
            assert_eq!(flavor.message(&ev), "Level up! You reached level 3 (+40 XP).");
        }
    }
}
