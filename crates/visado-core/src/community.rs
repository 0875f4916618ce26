use crate::ForumPost;

/// Seeded community feed shown until real posts exist.
pub fn seeded_posts() -> Vec<ForumPost> {
    vec![
        ForumPost {
            id: "post-1".to_string(),
            user_name: "Maria G.".to_string(),
            title: "Approved after two years — don't lose hope!".to_string(),
            content: "I finally received the approval notice today. The interview was \
                      actually much smoother than I expected, so keep your documents \
                      organized and breathe."
                .to_string(),
            likes: 142,
            comments: 23,
            timestamp: "2h ago".to_string(),
            tags: vec!["Success Story".to_string(), "Approval".to_string()],
        },
        ForumPost {
            id: "post-2".to_string(),
            user_name: "Ahmed K.".to_string(),
            title: "Request for Evidence on a translated birth certificate".to_string(),
            content: "I received a notice saying my birth certificate translation is \
                      invalid. Has anyone dealt with this and can share what the \
                      translator's certification needs to say?"
                .to_string(),
            likes: 12,
            comments: 5,
            timestamp: "5h ago".to_string(),
            tags: vec!["RFE".to_string(), "Help Needed".to_string()],
        },
        ForumPost {
            id: "post-3".to_string(),
            user_name: "Li Wei".to_string(),
            title: "Odds of a second work-visa lottery round?".to_string(),
            content: "Does anyone know how often a second selection round happens for \
                      capped work visas? My employer is willing to wait but I am \
                      anxious about the timeline."
                .to_string(),
            likes: 45,
            comments: 18,
            timestamp: "1d ago".to_string(),
            tags: vec!["Work Visa".to_string(), "Lottery".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_posts_have_unique_ids() {
        let posts = seeded_posts();
        assert!(!posts.is_empty());
        let mut ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), posts.len());
    }
}
