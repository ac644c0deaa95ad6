//! Exercise-template and user-settings operations on [`DataService`].

use super::DataService;
use crate::error::Result;
use crate::model::{ExerciseTemplate, UserSettings};
use crate::sync::SyncAction;

impl DataService {
    /// The template catalog; an empty store is seeded with the default
    /// catalog by whichever store answers.
    pub async fn get_exercise_templates(&self) -> Result<Vec<ExerciseTemplate>> {
        self.read(
            "load exercise templates",
            async || self.local.get_exercise_templates().await,
            async || self.remote.get_exercise_templates().await,
            async |templates: &Vec<ExerciseTemplate>| {
                self.local.replace_templates(templates).await
            },
        )
        .await
    }

    pub async fn save_exercise_template(
        &self,
        template: &ExerciseTemplate,
    ) -> Result<ExerciseTemplate> {
        self.write(
            "save exercise template",
            async || {
                self.local.save_exercise_template(template).await?;
                Ok(template.clone())
            },
            async || self.remote.save_exercise_template(template).await,
            || SyncAction::SaveTemplate(template.clone()),
        )
        .await
    }

    pub async fn get_user_settings(&self) -> Result<UserSettings> {
        self.read(
            "load user settings",
            async || self.local.get_user_settings().await,
            async || self.remote.get_user_settings().await,
            async |settings: &UserSettings| self.local.save_user_settings(settings).await,
        )
        .await
    }

    pub async fn save_user_settings(&self, settings: &UserSettings) -> Result<()> {
        self.write(
            "save user settings",
            async || self.local.save_user_settings(settings).await,
            async || self.remote.save_user_settings(settings).await,
            || SyncAction::SaveSettings(settings.clone()),
        )
        .await
    }
}
