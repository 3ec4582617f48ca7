//! Deterministic prompt assembly, one builder per generation mode.
//!
//! Schemas are literal templates with named `{TOKEN}` markers substituted via
//! `str::replace`; the world state is rendered from the snapshot the caller
//! passes in, never queried. Identical inputs produce identical prompts.

use story_world_proto::{
    FactionProfile, GenerationRequest, NovelRequest, WorldSnapshot, RECENT_EVENT_WINDOW,
    RECENT_NOVEL_WINDOW,
};

/// Cap on factions listed in the novel prompt.
const NOVEL_FACTION_WINDOW: usize = 5;
/// Cap on characters listed in the novel prompt.
const NOVEL_CHARACTER_WINDOW: usize = 8;
/// Descriptions and chapter summaries are cut to this many characters.
const SUMMARY_CHARS: usize = 100;

/// System and user message for one model invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const WORLD_SYSTEM: &str = r##"你是一个创意丰富的世界构建大师。用户会给你一个世界背景设定，请你：
1. 完善和丰富这个世界的背景故事
2. 设计这个世界的地理环境和修炼体系
3. 创造这个世界的文化和社会结构
4. 定义重要的历史事件
5. 创建主要的地图区域

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
{
    "world_introduction": "世界的详细介绍",
    "enhanced_background": "完善后的世界背景",
    "cultivation_system": "修炼体系说明",
    "geography": "地理环境描述",
    "culture": "文化描述",
    "history": ["历史事件1", "历史事件2"],
    "map_regions": [
        {
            "name": "区域名称",
            "type": "州/城/山/区域",
            "description": "区域描述",
            "parent_name": "父级区域名称或null"
        }
    ],
    "summary": "生成摘要"
}
```"##;

pub fn world_prompt(background: &str) -> PromptPair {
    PromptPair {
        system: WORLD_SYSTEM.to_string(),
        user: format!("世界背景设定：{background}"),
    }
}

const COMPLETE_WORLD_SYSTEM: &str =
    "你是一个专业的世界观设计师，擅长创造丰富、完整、逻辑自洽的虚拟世界。";

const COMPLETE_WORLD_USER: &str = r##"请根据以下基础设定，创建一个完整的世界观：

基础背景：{BACKGROUND}

请生成一个包含以下结构的JSON：
{
    "enhanced_background": "增强后的世界背景描述，比原始背景更丰富详细",
    "world_introduction": "详细的世界介绍，包括历史、文化、政治结构等",
    "cultivation_system": "修炼体系或力量体系的详细说明",
    "regions": [
        {
            "name": "地区名称",
            "type": "地区类型（如州、城、山脉等）",
            "description": "地区描述"
        }
    ],
    "factions": [
        {
            "name": "势力名称",
            "ideal": "势力理想和目标",
            "background": "势力历史背景",
            "description": "势力详细描述",
            "power_level": 势力强度(1-100的数字),
            "headquarters_location": "总部位置"
        }
    ],
    "characters": [
        {
            "name": "人物姓名",
            "faction_name": "所属势力名称",
            "personality": "性格特点",
            "age": 年龄数字,
            "birthday": "生日",
            "position": "职位",
            "realm": "修炼境界",
            "location": "当前位置",
            "goals": "个人目标",
            "relationships": "人际关系描述",
            "experience": "人物经历"
        }
    ]
}

要求：
1. 至少生成3-5个地区
2. 至少生成4-6个势力
3. 每个势力至少2-3个重要人物
4. 人物要有丰富的背景和明确的目标
5. 势力之间要有合理的关系和冲突
6. 地区应该有不同的特色和功能
7. 整个世界要逻辑自洽
8. 必须返回有效的JSON格式"##;

pub fn complete_world_prompt(background: &str) -> PromptPair {
    PromptPair {
        system: COMPLETE_WORLD_SYSTEM.to_string(),
        user: COMPLETE_WORLD_USER.replace("{BACKGROUND}", background),
    }
}

const FACTIONS_SYSTEM: &str = r##"基于给定的世界背景，创建3-5个不同的势力。

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
[
    {
        "name": "势力名称",
        "ideal": "势力理想",
        "background": "势力背景故事",
        "description": "详细描述",
        "status": "当前状态",
        "power_level": 75,
        "headquarters_location": "总部位置",
        "relationships": "与其他势力的关系描述"
    }
]
```"##;

pub fn factions_prompt(world_background: &str) -> PromptPair {
    PromptPair {
        system: FACTIONS_SYSTEM.to_string(),
        user: format!("世界背景：{world_background}"),
    }
}

const CHARACTERS_SYSTEM: &str = r##"基于世界背景和势力列表，为每个势力创建2-3个重要人物。

可用势力：{FACTIONS}

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
[
    {
        "name": "人物姓名",
        "faction_name": "所属势力名称",
        "status": "当前状态",
        "personality": "性格特点",
        "birthday": "生日",
        "age": 25,
        "location": "当前位置",
        "position": "在势力中的职位",
        "realm": "修炼境界",
        "lifespan": 150,
        "equipment": ["装备1", "装备2"],
        "skills": ["技能1", "技能2"],
        "experience": "人物经历描述",
        "goals": "个人目标",
        "relationships": "人际关系描述"
    }
]
```"##;

pub fn characters_prompt(world_background: &str, factions: &[FactionProfile]) -> PromptPair {
    let faction_info: Vec<serde_json::Value> = factions
        .iter()
        .map(|faction| {
            serde_json::json!({
                "name": faction.name,
                "description": faction.description,
            })
        })
        .collect();
    let faction_json = serde_json::to_string(&faction_info).unwrap_or_default();
    PromptPair {
        system: CHARACTERS_SYSTEM.replace("{FACTIONS}", &faction_json),
        user: format!("世界背景：{world_background}"),
    }
}

const SIMULATE_SYSTEM: &str = r##"你是一个沙盒游戏的事件生成器。基于当前的游戏状态和用户提供的故事引导，生成接下来{DAYS}天的精彩故事情节和事件。

### 世界背景
{BACKGROUND}

### 当前游戏状态
- 当前天数：第{CURRENT_DAY}天
- 用户故事引导：{GUIDE}

### 生成要求
1. 根据用户的故事引导"{GUIDE}"创造引人入胜的故事情节
2. 所有事件、更新和摘要必须与用户引导高度相关
3. 新生成的人物或势力必须与主要情节有关联
4. 每个事件必须包含明确的地点、时间、涉及人物和详细后果
5. 在character_updates和faction_updates中，必须包含发生变化的详细描述
6. 创建action为"create"的新人物时，必须提供完整的人物信息

### 摘要要求
摘要必须详细描述一整天内发生的主要事件，包括：
1. 清晰的时间线（按时间顺序排列的事件）
2. 所有关键人物的参与和反应
3. 地点和场景的描述
4. 重要的对话或冲突
5. 事件的后果和影响
6. 对接下来可能发展的暗示
7. 新出现的人物的详细介绍

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
{STORY_PROGRESS_SCHEMA}
```"##;

/// Body of the story_progress object, shared by the simulate, combined and
/// streamed schemas. `{INDENT}` prefixes every line so the nested variants
/// stay readably indented.
const STORY_PROGRESS_SCHEMA: &str = r##"{INDENT}{
{INDENT}    "world_events": [
{INDENT}        {
{INDENT}            "day": {NEXT_DAY},
{INDENT}            "time_period": "具体时间段（如清晨/上午/中午/下午/傍晚/夜晚）",
{INDENT}            "faction_id": null,
{INDENT}            "theme": "事件主题",
{INDENT}            "title": "引人注目的事件标题",
{INDENT}            "description": "详细的事件描述，包含地点、人物反应和事件后果",
{INDENT}            "region_id": null,
{INDENT}            "location": "具体地点名称"
{INDENT}        }
{INDENT}    ],
{INDENT}    "faction_events": [
{INDENT}        {
{INDENT}            "faction_id": null,
{INDENT}            "day": {NEXT_DAY},
{INDENT}            "time_period": "具体时间段",
{INDENT}            "theme": "事件主题",
{INDENT}            "title": "引人注目的事件标题",
{INDENT}            "description": "详细的事件描述，包含地点、参与人物和事件后果"
{INDENT}        }
{INDENT}    ],
{INDENT}    "character_events": [
{INDENT}        {
{INDENT}            "character_id": null,
{INDENT}            "day": {NEXT_DAY},
{INDENT}            "time_period": "具体时间段",
{INDENT}            "theme": "事件主题",
{INDENT}            "title": "引人注目的事件标题",
{INDENT}            "description": "详细的角色活动描述，包含地点、互动人物和活动结果"
{INDENT}        }
{INDENT}    ],
{INDENT}    "faction_updates": [
{INDENT}        {
{INDENT}            "faction_id": null,
{INDENT}            "name": "势力名称（如果是新势力）",
{INDENT}            "status": "势力状态更新",
{INDENT}            "power_level": 数值(1-100),
{INDENT}            "description": "势力变化的详细描述",
{INDENT}            "headquarters_location": "总部位置",
{INDENT}            "action": "update或create",
{INDENT}            "change_reason": "变化的原因"
{INDENT}        }
{INDENT}    ],
{INDENT}    "character_updates": [
{INDENT}        {
{INDENT}            "character_id": null,
{INDENT}            "name": "人物名称（如果是新人物）",
{INDENT}            "faction_id": null,
{INDENT}            "faction_name": "所属势力名称（如果是新人物）",
{INDENT}            "status": "人物状态更新",
{INDENT}            "age": 数值,
{INDENT}            "location": "当前位置",
{INDENT}            "position": "职位更新",
{INDENT}            "realm": "境界更新",
{INDENT}            "experience": "经历更新",
{INDENT}            "goals": "目标更新",
{INDENT}            "action": "update或create",
{INDENT}            "personality": "人物性格（如果是新人物）",
{INDENT}            "appearance": "外貌描述（如果是新人物）",
{INDENT}            "skills": ["技能1", "技能2"],
{INDENT}            "change_reason": "变化的详细原因"
{INDENT}        }
{INDENT}    ],
{INDENT}    "new_time": "第{END_DAY}天，具体时间段",
{INDENT}    "summary": "详细的故事摘要，描述一整天的事件发展"
{INDENT}}"##;

const NOVEL_SCHEMA: &str = r##"    "novel": {
        "title": "基于事件的小说标题（请使用吸引人的标题）",
        "chapters": [
            {
                "title": "第一章：章节标题",
                "content": "章节详细内容，用\n分隔段落，与生成的事件保持一致"
            }
        ]
    }"##;

const COMBINED_SYSTEM: &str = r##"你是一个专业的沙盒游戏内容生成器，能够同时创作故事推进和小说内容。基于用户的引导词，你需要：

1. 生成接下来1天的世界事件、势力变化和人物发展
2. 基于这些事件创作一部引人入胜的小说

### 世界背景
{BACKGROUND}

### 当前游戏状态
- 当前天数：第{CURRENT_DAY}天
- 用户引导：{GUIDE}

### 创作要求
1. 根据用户引导"{GUIDE}"创造连贯的故事情节
2. 所有事件必须与用户引导高度相关
3. 小说内容要与生成的事件保持一致
4. 新出现的人物或势力必须在小说中有所体现
5. 小说应该有完整的章节结构，每章不少于1000字
6. 事件描述要详细，包含地点、时间、人物反应和后果

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
{
    "story_progress": {STORY_PROGRESS_SCHEMA},
{NOVEL_SCHEMA}
}
```"##;

/// Streamed variant: the novel comes first so its title and chapter content
/// arrive early enough to be scanned out incrementally.
const STREAMED_SYSTEM: &str = r##"你是一个专业的沙盒游戏内容生成器，能够同时创作故事推进和小说内容。基于用户的引导词，你需要：

1. 首先生成一部引人入胜的小说（1章即可）
2. 然后生成接下来1天的世界事件、势力变化和人物发展

### 世界背景
{BACKGROUND}

### 当前游戏状态
- 当前天数：第{CURRENT_DAY}天
- 用户引导：{GUIDE}

### 创作要求
1. 根据用户引导"{GUIDE}"创造连贯的故事情节
2. 小说内容要生动有趣，不少于200字
3. 故事推进要与小说内容保持一致
4. 新出现的人物或势力必须在小说中有所体现
5. 事件描述要详细，包含地点、时间、人物反应和后果

请严格按照以下JSON格式返回，不要添加任何其他文字：
```json
{
{NOVEL_SCHEMA},
    "story_progress": {STORY_PROGRESS_SCHEMA}
}
```"##;

fn story_progress_schema(next_day: u32, end_day: u32, indent: &str) -> String {
    STORY_PROGRESS_SCHEMA
        .replace("{INDENT}", indent)
        .replace("{NEXT_DAY}", &next_day.to_string())
        .replace("{END_DAY}", &end_day.to_string())
}

pub fn simulate_prompt(snapshot: &WorldSnapshot, request: &GenerationRequest) -> PromptPair {
    let schema = story_progress_schema(
        request.current_day + 1,
        request.current_day + request.days,
        "",
    );
    let system = SIMULATE_SYSTEM
        .replace("{DAYS}", &request.days.to_string())
        .replace("{BACKGROUND}", &snapshot.background)
        .replace("{CURRENT_DAY}", &request.current_day.to_string())
        .replace("{GUIDE}", &request.guide)
        .replace("{STORY_PROGRESS_SCHEMA}", &schema);
    PromptPair {
        system,
        user: format!("{}\n{}", state_sections(snapshot), guide_section(&request.guide)),
    }
}

pub fn combined_prompt(snapshot: &WorldSnapshot, request: &GenerationRequest) -> PromptPair {
    let schema = story_progress_schema(request.current_day + 1, request.current_day + 1, "    ");
    // The nested schema starts mid-line after the key, drop its leading indent.
    let schema = schema.trim_start().to_string();
    let system = COMBINED_SYSTEM
        .replace("{BACKGROUND}", &snapshot.background)
        .replace("{CURRENT_DAY}", &request.current_day.to_string())
        .replace("{GUIDE}", &request.guide)
        .replace("{STORY_PROGRESS_SCHEMA}", &schema)
        .replace("{NOVEL_SCHEMA}", NOVEL_SCHEMA);
    PromptPair {
        system,
        user: combined_context(snapshot, &request.guide),
    }
}

pub fn streamed_prompt(snapshot: &WorldSnapshot, request: &GenerationRequest) -> PromptPair {
    let schema = story_progress_schema(request.current_day + 1, request.current_day + 1, "    ");
    let schema = schema.trim_start().to_string();
    let system = STREAMED_SYSTEM
        .replace("{BACKGROUND}", &snapshot.background)
        .replace("{CURRENT_DAY}", &request.current_day.to_string())
        .replace("{GUIDE}", &request.guide)
        .replace("{NOVEL_SCHEMA}", NOVEL_SCHEMA)
        .replace("{STORY_PROGRESS_SCHEMA}", &schema);
    PromptPair {
        system,
        user: combined_context(snapshot, &request.guide),
    }
}

const NOVEL_SYSTEM: &str = "你是一个专业的小说创作AI，擅长根据世界设定创作引人入胜的故事。";

const NOVEL_USER_TAIL: &str = r##"
请生成一个包含以下结构的完整小说，内容丰富，章节分明：
{
    "title": "小说标题（请使用吸引人的标题）",
    "chapters": [
        {
            "title": "第一章：章节标题",
            "content": "章节详细内容，用\n分隔段落"
        },
        {
            "title": "第二章：章节标题",
            "content": "章节详细内容，用\n分隔段落"
        },
        {
            "title": "第三章：章节标题",
            "content": "章节详细内容，用\n分隔段落"
        }
    ]
}

创作要求：
1. 内容必须符合世界观设定，与已有事件保持连贯性
2. 人物性格要与设定一致，言行举止有鲜明特点
3. 文风符合选择的风格，用词丰富多彩
4. 情节要有起伏转折，引人入胜
5. 每章内容应不少于1000字，整体篇幅约5000-8000字
6. 必须返回规范的JSON格式，确保可被解析
7. 为每个章节设计合理的标题，反映章节主要内容
8. 使用丰富的细节描写，包括场景、对话、心理活动等
9. 主角应在小说中占有重要位置，展现其性格特点和成长轨迹
10. 情节发展应具有合理性和连贯性，让读者能够沉浸其中
11. 适当使用修辞手法增强文学性和可读性"##;

pub fn novel_prompt(snapshot: &WorldSnapshot, request: &NovelRequest) -> PromptPair {
    let mut user = format!(
        "请根据以下世界设定生成一个{style}风格的小说片段：\n\n世界背景：{background}\n",
        style = request.style,
        background = snapshot.background,
    );

    user.push_str("\n主要势力：\n");
    for faction in snapshot.factions.iter().take(NOVEL_FACTION_WINDOW) {
        user.push_str(&format!("- {}: {}\n", faction.name, faction.description));
    }
    user.push_str("\n主要人物：\n");
    for character in snapshot.characters.iter().take(NOVEL_CHARACTER_WINDOW) {
        user.push_str(&format!(
            "- {}: {}\n",
            character.name, character.personality
        ));
    }
    user.push_str(&format!(
        "\n小说主题：{theme}\n时间范围：第{day}天\n写作风格：{style}\n",
        theme = request.theme,
        day = request.day,
        style = request.style,
    ));

    if !snapshot.recent_events.is_empty() {
        user.push_str("\n最近发生的事件：\n");
        user.push_str(&recent_event_lines(snapshot));
    }
    if !snapshot.recent_novels.is_empty() {
        user.push_str("\n最近的小说内容概要：\n");
        user.push_str(&recent_novel_lines(snapshot));
    }

    user.push_str(NOVEL_USER_TAIL);
    PromptPair {
        system: NOVEL_SYSTEM.to_string(),
        user,
    }
}

/// 势力/人物/地区 state rendered as pretty JSON sections.
fn state_sections(snapshot: &WorldSnapshot) -> String {
    format!(
        "### 势力情况\n{}\n\n### 人物情况\n{}\n\n### 地区情况\n{}\n",
        serde_json::to_string_pretty(&snapshot.factions).unwrap_or_default(),
        serde_json::to_string_pretty(&snapshot.characters).unwrap_or_default(),
        serde_json::to_string_pretty(&snapshot.regions).unwrap_or_default(),
    )
}

fn guide_section(guide: &str) -> String {
    format!(
        "### 用户故事引导\n用户希望接下来的故事围绕：\"{guide}\"进行发展。\
         请创造与此相关的情节，确保故事推进和小说内容都与这个主题高度相关。\n"
    )
}

fn combined_context(snapshot: &WorldSnapshot, guide: &str) -> String {
    let mut context = state_sections(snapshot);
    context.push_str("\n### 最近发生的事件\n");
    if snapshot.recent_events.is_empty() {
        context.push_str("暂无历史事件记录\n");
    } else {
        context.push_str(&recent_event_lines(snapshot));
    }
    if !snapshot.recent_novels.is_empty() {
        context.push_str("\n### 最近的小说内容概要\n");
        context.push_str(&recent_novel_lines(snapshot));
    }
    context.push('\n');
    context.push_str(&guide_section(guide));
    context
}

fn recent_event_lines(snapshot: &WorldSnapshot) -> String {
    let mut lines = String::new();
    for event in snapshot.recent_events.iter().take(RECENT_EVENT_WINDOW) {
        lines.push_str(&format!(
            "- 第{}天 {} - {}: {}...\n",
            event.day,
            event.time_period,
            event.title,
            head_chars(&event.description, SUMMARY_CHARS),
        ));
    }
    lines
}

fn recent_novel_lines(snapshot: &WorldSnapshot) -> String {
    let mut lines = String::new();
    for novel in snapshot.recent_novels.iter().take(RECENT_NOVEL_WINDOW) {
        let chapters: Vec<String> = novel
            .chapters
            .iter()
            .map(|chapter| {
                let summary = if chapter.content.chars().count() > SUMMARY_CHARS {
                    format!("{}...", head_chars(&chapter.content, SUMMARY_CHARS))
                } else {
                    chapter.content.clone()
                };
                format!("{} - {}", chapter.title, summary)
            })
            .collect();
        lines.push_str(&format!("- 《{}》: {}\n", novel.title, chapters.join("、")));
    }
    lines
}

/// First `n` characters, not bytes.
fn head_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_world_proto::{
        CharacterSummary, EventCategory, EventSummary, FactionSummary, NovelChapterSummary,
        NovelSummary,
    };

    fn snapshot() -> WorldSnapshot {
        WorldSnapshot {
            background: "灵气复苏的东洲大陆".to_string(),
            factions: vec![FactionSummary {
                id: 1,
                name: "青云宗".to_string(),
                status: "繁荣".to_string(),
                description: "名门正派".to_string(),
                power_level: 80,
                headquarters: "青云山".to_string(),
            }],
            characters: vec![CharacterSummary {
                id: 1,
                name: "林尘".to_string(),
                status: "活跃".to_string(),
                faction_id: Some(1),
                faction_name: Some("青云宗".to_string()),
                personality: "坚毅".to_string(),
                age: 19,
                position: "外门弟子".to_string(),
                realm: "炼气五层".to_string(),
                location: "青云山".to_string(),
            }],
            regions: Vec::new(),
            recent_events: Vec::new(),
            recent_novels: Vec::new(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            guide: "宗门大比".to_string(),
            current_day: 5,
            days: 3,
            model_config_id: None,
        }
    }

    #[test]
    fn simulate_prompt_substitutes_every_token() {
        let prompt = simulate_prompt(&snapshot(), &request());
        for token in ["{DAYS}", "{BACKGROUND}", "{CURRENT_DAY}", "{GUIDE}", "{NEXT_DAY}", "{END_DAY}", "{STORY_PROGRESS_SCHEMA}", "{INDENT}"] {
            assert!(!prompt.system.contains(token), "unreplaced {token}");
        }
        assert!(prompt.system.contains("生成接下来3天"));
        assert!(prompt.system.contains("\"day\": 6"));
        assert!(prompt.system.contains("第8天，具体时间段"));
        assert!(prompt.user.contains("青云宗"));
        assert!(prompt.user.contains("宗门大比"));
    }

    #[test]
    fn streamed_prompt_places_novel_before_story_progress() {
        let prompt = streamed_prompt(&snapshot(), &request());
        let novel_at = prompt.system.find("\"novel\"").expect("novel key");
        let progress_at = prompt
            .system
            .find("\"story_progress\"")
            .expect("story_progress key");
        assert!(novel_at < progress_at);
        assert!(prompt.system.contains("首先生成一部引人入胜的小说"));
        assert!(!prompt.system.contains("{NOVEL_SCHEMA}"));
    }

    #[test]
    fn combined_prompt_places_story_progress_first() {
        let prompt = combined_prompt(&snapshot(), &request());
        let novel_at = prompt.system.find("\"novel\"").expect("novel key");
        let progress_at = prompt
            .system
            .find("\"story_progress\"")
            .expect("story_progress key");
        assert!(progress_at < novel_at);
    }

    #[test]
    fn context_windows_are_applied() {
        let mut snap = snapshot();
        for day in 0..15 {
            snap.recent_events.push(EventSummary {
                category: EventCategory::World,
                day,
                time_period: "清晨".to_string(),
                title: format!("事件{day}"),
                description: "描".repeat(150),
            });
        }
        for index in 0..4 {
            snap.recent_novels.push(NovelSummary {
                title: format!("小说{index}"),
                chapters: vec![NovelChapterSummary {
                    title: "第一章".to_string(),
                    content: "短".to_string(),
                }],
            });
        }
        let prompt = combined_prompt(&snap, &request());
        let event_lines = prompt.user.matches("- 第").count();
        assert_eq!(event_lines, RECENT_EVENT_WINDOW);
        let novel_lines = prompt.user.matches("- 《").count();
        assert_eq!(novel_lines, RECENT_NOVEL_WINDOW);
        // Long descriptions are clipped to 100 chars before the ellipsis.
        assert!(prompt.user.contains(&format!("{}...", "描".repeat(100))));
        assert!(!prompt.user.contains(&"描".repeat(101)));
    }

    #[test]
    fn novel_prompt_lists_theme_style_and_day() {
        let novel_request = NovelRequest {
            theme: "复仇".to_string(),
            style: "热血".to_string(),
            day: 12,
            model_config_id: None,
        };
        let prompt = novel_prompt(&snapshot(), &novel_request);
        assert_eq!(prompt.system, NOVEL_SYSTEM);
        assert!(prompt.user.contains("热血风格的小说片段"));
        assert!(prompt.user.contains("小说主题：复仇"));
        assert!(prompt.user.contains("时间范围：第12天"));
        assert!(prompt.user.contains("- 林尘: 坚毅"));
    }

    #[test]
    fn same_inputs_same_prompt() {
        assert_eq!(
            simulate_prompt(&snapshot(), &request()),
            simulate_prompt(&snapshot(), &request())
        );
    }

    #[test]
    fn characters_prompt_embeds_faction_list() {
        let factions = vec![FactionProfile {
            name: "青云宗".to_string(),
            ideal: String::new(),
            background: String::new(),
            description: "名门正派".to_string(),
            status: String::new(),
            power_level: 80,
            headquarters_location: String::new(),
            relationships: String::new(),
        }];
        let prompt = characters_prompt("背景", &factions);
        assert!(prompt.system.contains("青云宗"));
        assert!(prompt.system.contains("名门正派"));
        assert!(!prompt.system.contains("{FACTIONS}"));
    }
}
