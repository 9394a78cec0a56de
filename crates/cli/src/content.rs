//! Built-in content of the 2025 year-end summary deck.

use deck_core::{Agenda, ContentBlock, Cover, DeckSpec, SlideSpec};

/// Default file name of the built deck.
pub const DEFAULT_DECK_FILE: &str = "2025_Year_End_Summary_Final_Styled.pptx";

const WORK_HEADER: &str = "■ 工作内容";
const METRICS_HEADER: &str = "■ 关键成效";
const INSIGHTS_HEADER: &str = "■ 工作心得";

/// The complete built-in deck.
pub fn deck() -> DeckSpec {
    DeckSpec {
        cover: Some(Cover {
            title: "2025 年度工作总结".to_string(),
            subtitle: vec!["工作回顾 · 问题复盘 · 新年规划".to_string()],
        }),
        agenda: Some(agenda()),
        slides: slides(),
        closing: Some(Cover {
            title: "感谢聆听".to_string(),
            subtitle: vec!["Thanks".to_string()],
        }),
    }
}

fn agenda() -> Agenda {
    Agenda {
        title: "目录".to_string(),
        entries: [
            "01. 年度工作总结",
            "    1.1 vCube 协作平台",
            "    1.2 VLA 日志分析",
            "    1.3 基础效能工具",
            "    1.4 AI 创新应用",
            "    1.5 快应用政务服务",
            "02. 问题回顾与建议",
            "03. 新年工作规划",
        ]
        .iter()
        .map(|entry| entry.to_string())
        .collect(),
    }
}

/// Work content on the left; key metrics and insights stacked on the right.
fn project(title: &str, work: &[&str], insights: &[&str], metrics: &[&str]) -> SlideSpec {
    SlideSpec {
        title: title.to_string(),
        blocks: vec![
            ContentBlock::new(WORK_HEADER, work.to_vec()),
            ContentBlock::new(METRICS_HEADER, Vec::<String>::new()).with_metrics(metrics.to_vec()),
            ContentBlock::new(INSIGHTS_HEADER, insights.to_vec()),
        ],
    }
}

fn slides() -> Vec<SlideSpec> {
    vec![
        project(
            "vCube 协作平台",
            &[
                "版本迭代：完成 v8.2.9.2 - v8.4.4 共6个版本，50+次功能迭代。",
                "统一协作：实现文本、选区、成员等多种批注类型，支持Bug一键流转Jira。",
                "实时协同：构建多人实时编辑引擎，保证数据一致性，替代传统Excel离线交互模式。",
            ],
            &[
                "价值主张：工具的价值在于'用完即走'，自动化流转降低了用户的操作成本。",
                "协作变革：彻底消除Excel版本混乱，实现数据源头的统一。",
            ],
            &["研发测试节省：140.6人天", "协作效率提升：90%"],
        ),
        project(
            "VLA 日志分析工具",
            &[
                "海量日志引擎：优化大文件加载算法，支持GB级日志秒级打开。",
                "深度可视化：实现Trace文件时序图展示，支持标准Log格式化解析与过滤。",
                "全链路压缩：实施日志上传与存储压缩策略，显著降低成本。",
            ],
            &[
                "体验升级：将枯燥的文本阅读转化为直观的'看图说话'，降低问题定位门槛。",
                "性能即体验：秒级打开大文件是核心竞争力。",
            ],
            &["日志压缩量：434 TB", "存储节省折算：4,740人天"],
        ),
        project(
            "运营商与政企定制",
            &[
                "自动化校验：开发工具自动检查FCC ID、GMS认证状态，覆盖双端配置。",
                "源头治理：在代码提交阶段拦截合规问题，避免版本回退。",
                "兼容适配：解决运营商项目复杂的配置差异问题。",
            ],
            &[
                "合规红线：用工具替代人工CheckList，确保100%准确。",
                "防患未然：在源头解决问题成本最低。",
            ],
            &["拦截合规问题：120+项", "人工校验节省：195人天"],
        ),
        project(
            "软件版本与FTP工具",
            &[
                "全流程自动化：实现版本自动下载、鉴权校验与更新检测。",
                "信息提取：自动解析ReleaseNote，减少人工整理工作量。",
                "场景优化：针对每日高频使用的下载场景进行极致提速。",
            ],
            &[
                "ROI思维：抓住'高频低价值'场景（如等待下载）进行优化，收益巨大。",
                "极简工具链：让工程师专注于核心创造性工作。",
            ],
            &["下载等待节省：9,200+人天", "使用频率：12,000+次"],
        ),
        project(
            "翻译管理 (AI重构)",
            &[
                "AI截图匹配：基于CV技术实现UI截图与翻译条目自动关联，匹配率>80%。",
                "流程自动化：替代人工截图与查找流程，大幅提升国际化适配效率。",
                "质量监控：自动检测翻译缺失与错误，保障多语言版本质量。",
            ],
            &[
                "AI务实落地：聚焦'重复性劳动'场景，释放人力资源。",
                "信任建立：只有高准确率才能让用户真正依赖AI工具。",
            ],
            &["截图匹配节省：1,183人天", "匹配成功率：>80%"],
        ),
        project(
            "桌面布局规范",
            &[
                "统一标准：制定并固化桌面布局配置，确保企业视觉风格统一。",
                "安全合规：实施敏感信息拦截策略，防止数据意外泄露。",
                "风险管控：通过技术手段规避潜在的法律与舆情风险。",
            ],
            &[
                "细节决定成败：微小的规范化改动支撑了企业的宏观安全战略。",
                "零事故目标：安全工作没有侥幸，必须100%覆盖。",
            ],
            &["安全风险拦截：100%覆盖", "合规事故：0起"],
        ),
        project(
            "交接中心",
            &[
                "业务支撑：支持INS预装、Recommended Apps等复杂分发业务逻辑。",
                "配置灵活：通过低成本配置改动，支撑千万级营收项目快速落地。",
                "流程优化：简化跨部门交接流程，提升业务流转效率。",
            ],
            &[
                "商业价值：技术直接服务于营收，小功能撬动大收益。",
                "敏捷响应：快速响应商业需求是技术团队的核心价值之一。",
            ],
            &["内部协作节省：247人天", "支撑营收：千万级"],
        ),
        project(
            "快应用国家政务服务平台",
            &[
                "核心保障：零故障支撑高考查分、社保医保支付等亿级流量服务。",
                "生态连接：适配OPPO侧卡片样式，部署通用查询接口，打破厂商壁垒。",
                "体验重构：优化证照中心交互，去除非必要鉴权，提升转化率。",
            ],
            &[
                "底线思维：政务服务关乎民生，稳定性是最高优先级。",
                "体验为王：每一个多余点击的去除，都是对用户的尊重。",
            ],
            &["服务稳定性：99.99%", "核心流量：PV 90w+"],
        ),
        problems(),
        plan(),
    ]
}

/// Each issue becomes a headline bullet with its description and impact as
/// sub-items; the fixes go to the right column.
fn problems() -> SlideSpec {
    SlideSpec {
        title: "问题回顾与改进建议".to_string(),
        blocks: vec![
            ContentBlock::new(
                "■ 问题与影响",
                vec![
                    "基础设施稳定性",
                    "* OAuth Code依赖系统时间同步，Nginx鉴权在系统时间漂移时偶发失败。",
                    "* 影响：导致用户登录失败，引发客诉；部分旧系统接口缺乏秒级监控，响应滞后。",
                    "研发效能瓶颈",
                    "* Code Review主要依赖人工，在发版高峰期效率低下。",
                    "* 影响：基础规范问题容易遗漏，不仅占用高级人力，还可能导致线上隐患。",
                ],
            ),
            ContentBlock::new(
                "■ 改进建议",
                vec![
                    "推进运维侧统一NTP时间同步，消除时间漂移隐患。",
                    "建立全链路Nginx配置标准与秒级监控报警。",
                    "引入AI辅助Code Review工具，将命名规范、代码风格等检查自动化，让人聚焦逻辑架构。",
                ],
            ),
        ],
    }
}

fn plan() -> SlideSpec {
    SlideSpec {
        title: "2026年工作规划".to_string(),
        blocks: vec![
            ContentBlock::new(
                "■ 业务深耕",
                vec![
                    "医保移动支付",
                    "* 打通医保支付全流程，落地标杆省份，实现政务服务闭环。",
                    "政务服务标杆",
                    "* 优化证照中心体验，提升用户转化率，打造行业样板。",
                ],
            ),
            ContentBlock::new(
                "■ 平台进化",
                vec![
                    "MEAT Agent：引入智能体自动生成测试用例，降低QA回归成本。",
                    "日志分析升级：VLA支持更多日志格式解析，覆盖更多业务场景。",
                ],
            ),
            ContentBlock::new(
                "■ 技术沉淀",
                vec![
                    "组件库建设：沉淀高质量通用前端组件库，提升开发效率与UI一致性。",
                    "鸿蒙原生探索：预研鸿蒙Next开发技术，储备原生应用开发能力。",
                ],
            ),
        ],
    }
}
