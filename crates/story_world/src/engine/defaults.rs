//! Deterministic fallback content. Every generation operation lands here when
//! the model call or the extraction fails, so callers always receive a
//! well-formed result. Variety comes from indexing on the day number, which
//! keeps identical inputs producing identical output.

use story_world_proto::{
    CharacterProfile, CombinedStory, CompleteWorld, EventRecord, FactionProfile, Novel,
    NovelChapter, RegionSeed, StoryProgress, WorldResult,
};

const THEMES: [&str; 5] = ["日常发展", "冲突事件", "修炼突破", "机缘巧合", "势力变动"];
const TIME_PERIODS: [&str; 7] = ["清晨", "上午", "中午", "下午", "傍晚", "夜晚", "深夜"];

/// Faction count the default character roster covers.
const DEFAULT_CHARACTER_FACTIONS: usize = 3;

fn theme_for(day: u32) -> &'static str {
    THEMES[day as usize % THEMES.len()]
}

fn time_period_for(day: u32) -> &'static str {
    TIME_PERIODS[day as usize % TIME_PERIODS.len()]
}

pub fn default_world(background: &str) -> WorldResult {
    WorldResult {
        world_introduction: format!("这是一个基于'{background}'的奇幻世界，充满了神秘与冒险。"),
        enhanced_background: if background.is_empty() {
            "默认奇幻世界".to_string()
        } else {
            background.to_string()
        },
        cultivation_system: "境界分为：炼气、筑基、金丹、元婴、化神、合体、大乘、渡劫".to_string(),
        geography: "多样化的地形，包含森林、山脉、河流和平原".to_string(),
        culture: "多元化的文明，各有特色".to_string(),
        history: vec![
            "远古时代的传说".to_string(),
            "英雄时代的兴起".to_string(),
            "现代的变革".to_string(),
        ],
        map_regions: vec![
            RegionSeed {
                name: "中心大陆".to_string(),
                kind: "州".to_string(),
                description: "世界的中心区域".to_string(),
                parent_name: None,
            },
            RegionSeed {
                name: "天元城".to_string(),
                kind: "城".to_string(),
                description: "繁华的都城".to_string(),
                parent_name: Some("中心大陆".to_string()),
            },
            RegionSeed {
                name: "灵山".to_string(),
                kind: "山".to_string(),
                description: "灵气浓郁的修行圣地".to_string(),
                parent_name: Some("中心大陆".to_string()),
            },
        ],
        summary: "生成了基础的世界设定".to_string(),
    }
}

/// Minimal complete-world skeleton: the caller's background survives and the
/// placeholder fields say what needs manual attention.
pub fn default_complete_world(background: &str) -> CompleteWorld {
    CompleteWorld {
        enhanced_background: background.to_string(),
        world_introduction: "AI生成失败，请手动填写世界介绍".to_string(),
        cultivation_system: "AI生成失败，请手动填写修炼体系".to_string(),
        regions: Vec::new(),
        factions: Vec::new(),
        characters: Vec::new(),
    }
}

pub fn default_factions() -> Vec<FactionProfile> {
    vec![
        FactionProfile {
            name: "光明圣殿".to_string(),
            ideal: "维护世界正义与秩序".to_string(),
            background: "成立于千年前的古老宗教组织".to_string(),
            description: "崇尚正义与秩序的圣殿".to_string(),
            status: "繁荣发展".to_string(),
            power_level: 85,
            headquarters_location: "圣光城".to_string(),
            relationships: "与邪恶势力对立，与中立势力保持友好".to_string(),
        },
        FactionProfile {
            name: "暗影联盟".to_string(),
            ideal: "追求绝对的自由与力量".to_string(),
            background: "由被驱逐的修士组成的神秘组织".to_string(),
            description: "在阴影中活动的神秘组织".to_string(),
            status: "暗中发展".to_string(),
            power_level: 70,
            headquarters_location: "幽暗森林".to_string(),
            relationships: "与光明圣殿敌对，与商人公会合作".to_string(),
        },
        FactionProfile {
            name: "万宝商会".to_string(),
            ideal: "以财富连接世界，促进贸易繁荣".to_string(),
            background: "由各地商人联合组建的商业联盟".to_string(),
            description: "控制贸易路线的强大商业联盟".to_string(),
            status: "活跃交易".to_string(),
            power_level: 65,
            headquarters_location: "商业之都".to_string(),
            relationships: "保持中立，与各方势力都有贸易往来".to_string(),
        },
    ]
}

/// Leader plus elder for each of the first three factions.
pub fn default_characters(faction_names: &[String]) -> Vec<CharacterProfile> {
    let mut characters = Vec::new();
    for faction in faction_names.iter().take(DEFAULT_CHARACTER_FACTIONS) {
        characters.push(CharacterProfile {
            name: format!("{faction}宗主"),
            faction_name: faction.clone(),
            status: "活跃".to_string(),
            personality: "威严、睿智、有领导力".to_string(),
            birthday: "春月初三".to_string(),
            age: 45,
            location: format!("{faction}总部"),
            position: "宗主".to_string(),
            realm: "化神期".to_string(),
            lifespan: 200,
            equipment: vec!["宗主令牌".to_string(), "神器长剑".to_string()],
            skills: vec![
                "御剑术".to_string(),
                "神识探测".to_string(),
                "领导统御".to_string(),
            ],
            experience: format!("年少时加入{faction}，经过数十年修炼成为宗主"),
            goals: format!("带领{faction}走向辉煌，维护宗门利益"),
            relationships: "受到本势力成员尊敬，与其他势力领袖互有联系".to_string(),
        });
        characters.push(CharacterProfile {
            name: format!("{faction}长老"),
            faction_name: faction.clone(),
            status: "活跃".to_string(),
            personality: "智慧、谨慎、经验丰富".to_string(),
            birthday: "秋月十五".to_string(),
            age: 60,
            location: format!("{faction}议事厅"),
            position: "大长老".to_string(),
            realm: "元婴后期".to_string(),
            lifespan: 180,
            equipment: vec!["长老袍".to_string(), "智慧法杖".to_string()],
            skills: vec![
                "阵法精通".to_string(),
                "炼丹术".to_string(),
                "策略规划".to_string(),
            ],
            experience: format!("在{faction}服务超过40年的资深长老"),
            goals: "为势力提供智慧建议，培养后辈弟子".to_string(),
            relationships: "宗主的得力助手，门内弟子的引路人".to_string(),
        });
    }
    characters
}

/// One quiet placeholder event per simulated day.
pub fn default_story_progress(current_day: u32, days: u32) -> StoryProgress {
    let mut world_events = Vec::new();
    let mut faction_events = Vec::new();
    let mut character_events = Vec::new();

    for offset in 0..days {
        let day = current_day + offset + 1;
        world_events.push(EventRecord {
            day,
            time_period: time_period_for(day).to_string(),
            theme: theme_for(day).to_string(),
            title: format!("第{day}天的世界事件"),
            description: "世界继续按照既定的轨道运行，各方势力都在暗中积蓄力量，修炼者们寻找着突破的契机。偶尔有流星划过夜空，引起修士们的关注和猜测。".to_string(),
            location: Some("世界各地".to_string()),
            faction_id: None,
            character_id: None,
            region_id: None,
        });
        faction_events.push(EventRecord {
            day,
            time_period: time_period_for(day + 1).to_string(),
            theme: "势力活动".to_string(),
            title: "某势力的日常运转".to_string(),
            description: "各大势力按部就班地运转着，弟子们勤修苦练，长老们指点迷津。有些势力在筹备招收新弟子的事宜，有些则在筹划秘境探索。".to_string(),
            location: None,
            faction_id: None,
            character_id: None,
            region_id: None,
        });
        character_events.push(EventRecord {
            day,
            time_period: time_period_for(day + 2).to_string(),
            theme: "个人成长".to_string(),
            title: "修炼者的日常".to_string(),
            description: "各路修炼者继续着自己的修行之路，有人闭关苦修，有人游历世间，也有人在寻找突破的契机。这是修行路上平凡而重要的一天。".to_string(),
            location: None,
            faction_id: None,
            character_id: None,
            region_id: None,
        });
    }

    let end_day = current_day + days;
    StoryProgress {
        world_events,
        faction_events,
        character_events,
        faction_updates: Vec::new(),
        character_updates: Vec::new(),
        new_time: format!("第{end_day}天，{}", time_period_for(end_day)),
        summary: format!(
            "这{days}天里，世界保持着相对稳定的状态。各大势力秩序井然地运转，修炼者们继续着各自的修行之路。虽然没有发生重大事件，但暗流涌动，各方势力都在为未来的变局做着准备。世界似乎正在酝酿着某种变化，只是时机尚未成熟。"
        ),
    }
}

pub fn default_novel(theme: &str) -> Novel {
    Novel {
        title: format!("{theme}（生成失败）"),
        chapters: vec![NovelChapter {
            title: "第一章：默认内容".to_string(),
            content: "生成小说时发生错误，请稍后再试。".to_string(),
        }],
    }
}

pub fn default_story_and_novel(current_day: u32, guide: &str) -> CombinedStory {
    let day = current_day + 1;
    let time_period = time_period_for(day);

    let story_progress = StoryProgress {
        world_events: vec![EventRecord {
            day,
            time_period: time_period.to_string(),
            theme: theme_for(day).to_string(),
            title: format!("第{day}天的世界变化"),
            description: format!(
                "基于用户引导'{guide}'，世界发生了微妙的变化。各方势力都在暗中观察，等待时机的到来。"
            ),
            location: Some("世界各地".to_string()),
            faction_id: None,
            character_id: None,
            region_id: None,
        }],
        faction_events: vec![EventRecord {
            day,
            time_period: time_period.to_string(),
            theme: "势力活动".to_string(),
            title: "势力的新动向".to_string(),
            description: format!("受到'{guide}'的影响，各大势力开始调整自己的策略和布局。"),
            location: None,
            faction_id: None,
            character_id: None,
            region_id: None,
        }],
        character_events: vec![EventRecord {
            day,
            time_period: time_period.to_string(),
            theme: "个人成长".to_string(),
            title: "修炼者的感悟".to_string(),
            description: format!("在'{guide}'的启发下，修炼者们有了新的感悟和突破。"),
            location: None,
            faction_id: None,
            character_id: None,
            region_id: None,
        }],
        faction_updates: Vec::new(),
        character_updates: Vec::new(),
        new_time: format!("第{day}天，{time_period}"),
        summary: format!(
            "第{day}天，围绕'{guide}'展开了一系列事件。世界在悄然发生变化，各方势力和人物都受到了不同程度的影响。"
        ),
    };

    let novel = Novel {
        title: format!("基于'{guide}'的传奇"),
        chapters: vec![
            NovelChapter {
                title: "第一章：序幕".to_string(),
                content: format!(
                    "在这个充满奇幻色彩的世界里，'{guide}'成为了改变一切的关键。\n\n{time_period}时分，天空中飘过几朵白云，预示着即将到来的变化。各方势力都在暗中观察，等待着最佳的时机。\n\n修炼者们感受到了空气中微妙的变化，他们知道，一个新的时代即将到来。"
                ),
            },
            NovelChapter {
                title: "第二章：变化".to_string(),
                content: format!(
                    "随着'{guide}'的影响逐渐扩散，整个世界开始发生微妙的变化。\n\n各大势力的领袖们聚集在密室中，讨论着应对策略。他们明白，这次的变化将会影响到整个世界的格局。\n\n与此同时，普通的修炼者们也感受到了这种变化带来的机遇和挑战。"
                ),
            },
            NovelChapter {
                title: "第三章：新的开始".to_string(),
                content: format!(
                    "在'{guide}'的指引下，世界迎来了新的篇章。\n\n无论是强大的势力，还是普通的修炼者，都在这个变化中寻找着属于自己的道路。\n\n故事还在继续，未来充满了无限的可能性。"
                ),
            },
        ],
    };

    CombinedStory {
        story_progress,
        novel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_story_progress_covers_every_day() {
        let progress = default_story_progress(5, 3);
        assert_eq!(progress.world_events.len(), 3);
        assert_eq!(progress.world_events[0].day, 6);
        assert_eq!(progress.world_events[2].day, 8);
        assert!(progress.new_time.starts_with("第8天"));
    }

    #[test]
    fn defaults_are_deterministic() {
        assert_eq!(default_story_progress(5, 2), default_story_progress(5, 2));
        assert_eq!(
            default_story_and_novel(3, "引导"),
            default_story_and_novel(3, "引导")
        );
    }

    #[test]
    fn default_characters_limit_to_three_factions() {
        let names: Vec<String> = ["甲", "乙", "丙", "丁"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        let characters = default_characters(&names);
        assert_eq!(characters.len(), 6);
        assert!(characters.iter().all(|c| c.faction_name != "丁"));
        assert_eq!(characters[0].name, "甲宗主");
        assert_eq!(characters[1].position, "大长老");
    }

    #[test]
    fn default_story_and_novel_threads_the_guide() {
        let combined = default_story_and_novel(1, "寻宝");
        assert!(combined.novel.title.contains("寻宝"));
        assert_eq!(combined.novel.chapters.len(), 3);
        assert!(combined.story_progress.summary.contains("寻宝"));
    }
}
