use super::{SpotifyClient, read_json};
use crate::{
    error::Result,
    types::{AddTrackToPlaylistRequest, AddTrackToPlaylistResponse},
};

impl SpotifyClient {
    /// Appends `uris` to a playlist and returns the new snapshot id.
    ///
    /// Not retried: a repeated request would add the tracks twice.
    pub async fn add_tracks_to_playlist(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse> {
        let url = self.api_url(&format!("/playlists/{playlist_id}/tracks"));
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&AddTrackToPlaylistRequest {
                uris: uris.to_vec(),
            })
            .send()
            .await?;
        read_json(response).await
    }
}
