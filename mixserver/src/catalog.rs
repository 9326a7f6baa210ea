//! Built-in catalogue of 90s music videos, served when no search backend is
//! available.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::Song;

const SAMPLE_90S_SONGS: [(&str, &str, &str); 20] = [
    ("Smells Like Teen Spirit", "Nirvana", "hTWKbfoikeg"),
    ("Waterfalls", "TLC", "8WEtxJ4-sh4"),
    ("Vogue", "Madonna", "GuJQSAiODqI"),
    ("...Baby One More Time", "Britney Spears", "C-u5WLJ9Yk4"),
    ("No Scrubs", "TLC", "FrLequ6dUdM"),
    ("Wannabe", "Spice Girls", "gJLIiF15wjQ"),
    ("I Want It That Way", "Backstreet Boys", "4fndeDfaWCg"),
    ("Gangsta's Paradise", "Coolio", "fPO76Jlnz6c"),
    ("Wonderwall", "Oasis", "bx1Bh8ZvH84"),
    ("Ms. Jackson", "OutKast", "MYxAiK6VnXw"),
    ("U Can't Touch This", "MC Hammer", "otCpCn0l4Wo"),
    ("Don't Speak", "No Doubt", "TR3Vdo5etCQ"),
    ("Black Hole Sun", "Soundgarden", "3mbBbFH9fAg"),
    ("Barbie Girl", "Aqua", "ZyhrYis509A"),
    ("All Star", "Smash Mouth", "L_jWHffIx5E"),
    ("Zombie", "The Cranberries", "6Ejga4kJUts"),
    ("Bitter Sweet Symphony", "The Verve", "1lyu1KKwC74"),
    ("Virtual Insanity", "Jamiroquai", "4JkIs37a2JE"),
    ("Sabotage", "Beastie Boys", "z5rRZdiu1UE"),
    ("Californication", "Red Hot Chili Peppers", "YlUKcNNmywk"),
];

/// Thumbnail URL of a video, in the format used by the catalogue.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// The whole catalogue, in its reference order.
pub fn sample_songs() -> Vec<Song> {
    SAMPLE_90S_SONGS
        .iter()
        .map(|(title, artist, video_id)| Song {
            title: title.to_string(),
            artist: artist.to_string(),
            video_id: video_id.to_string(),
            thumbnail: thumbnail_url(video_id),
        })
        .collect()
}

/// `count` distinct songs of the catalogue in random order.
pub fn shuffled_sample<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Song> {
    let mut songs = sample_songs();
    songs.shuffle(rng);
    songs.truncate(count);
    songs
}

pub fn catalogue_len() -> usize {
    SAMPLE_90S_SONGS.len()
}
