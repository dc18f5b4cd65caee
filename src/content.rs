//! Static content shown across the scenes.

use serde::Serialize;

/// A record the user can put on the turntable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicDisc {
    pub id: &'static str,
    pub title: &'static str,
    /// CSS class for the label gradient
    pub color: &'static str,
    /// Audio source URL
    pub src: &'static str,
}

pub const MUSIC_DISCS: [MusicDisc; 3] = [
    MusicDisc {
        id: "1",
        title: "Sentimental Piano",
        color: "label-amber",
        src: "https://cdn.pixabay.com/audio/2022/03/10/audio_5b3c37575d.mp3",
    },
    MusicDisc {
        id: "2",
        title: "Acoustic Warmth",
        color: "label-stone",
        src: "https://cdn.pixabay.com/audio/2022/05/27/audio_1808fbf07a.mp3",
    },
    MusicDisc {
        id: "3",
        title: "Night Jazz",
        color: "label-indigo",
        src: "https://cdn.pixabay.com/audio/2022/01/18/audio_d0a13f69d2.mp3",
    },
];

/// Look up a record by id
pub fn find_disc(id: &str) -> Option<&'static MusicDisc> {
    MUSIC_DISCS.iter().find(|d| d.id == id)
}

pub const LETTER_TEXT: &str = "
亲爱的，

又到了一年的尾声。
回首这一年，最幸运的事便是遇见了你。
在这个纷繁复杂的世界里，
只要想到有你在身边，
心里就觉得格外安宁。

我想告诉你，
你是我平淡岁月里的星辰，
也是我漫长旅途中的归处。

新年快乐。
";

/// Messages carried by shooting stars (drawn with replacement)
pub const STAR_MESSAGES: [&str; 10] = [
    "遇见你是我最大的运气",
    "想和你吃每一顿早餐",
    "你的眼睛里有星星",
    "喜欢你笑起来的样子",
    "以后的路，我们一起走",
    "想牵着你的手去很多地方",
    "你是我心底的温柔",
    "每一天都更喜欢你一点",
    "不论风雨，我都在",
    "新年快乐，我的爱人",
];

pub const FINAL_MESSAGE: &str = "陪你走过剩下的所有春夏秋冬";

/// Hint drawn on the scratch fog
pub const SCRATCH_HINT: &str = "Rub screen to reveal";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_disc() {
        assert_eq!(find_disc("2").map(|d| d.title), Some("Acoustic Warmth"));
        assert!(find_disc("42").is_none());
    }

    #[test]
    fn test_disc_ids_unique() {
        for (i, a) in MUSIC_DISCS.iter().enumerate() {
            for b in &MUSIC_DISCS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
