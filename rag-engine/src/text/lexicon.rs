//! Built-in vocabulary for the lexicon tokenizer.

use std::collections::HashSet;

/// Legal and privacy-policy vocabulary.
pub const LEGAL_TERMS: &[&str] = &[
    "个人信息", "个人信息保护", "敏感个人信息", "个人信息处理者", "隐私政策", "隐私",
    "数据处理", "数据安全", "网络安全", "用户同意", "明示同意", "单独同意", "撤回同意",
    "知识产权", "著作权", "专利权", "商标权", "商业秘密", "许可", "授权", "许可使用",
    "违约责任", "违约金", "违约", "赔偿", "损害赔偿", "免责", "免责条款", "责任限制",
    "争议解决", "仲裁", "诉讼", "管辖", "法院", "适用法律", "法律适用",
    "合同", "协议", "服务协议", "用户协议", "甲方", "乙方", "当事人", "双方",
    "权利", "义务", "责任", "条款", "保密", "保密义务", "终止", "解除", "变更",
    "生效", "有效期", "不可抗力", "通知", "送达", "第三方", "共享", "转让",
    "公开披露", "委托处理", "跨境传输", "存储", "保存期限", "删除", "更正", "查阅",
    "复制", "注销", "未成年人", "监护人", "儿童", "安全措施", "加密", "去标识化",
    "匿名化", "投诉", "举报", "联系方式", "法律法规", "中华人民共和国",
    "个人信息保护法", "数据安全法", "网络安全法", "民法典", "著作权法", "专利法",
    "商标法", "收集", "使用", "处理", "目的", "范围", "定义", "告知", "规定", "约定",
    "应当", "不得", "有权", "必须", "禁止", "违反", "侵权", "侵犯", "设备信息",
    "位置信息", "日志信息", "身份信息", "账号", "密码", "支付", "费用", "付款",
    "服务费", "知识产权归属", "成果", "交付", "验收", "履行", "承担", "依法",
];

/// Frequent general words that help segmentation.
pub const COMMON_WORDS: &[&str] = &[
    "用户", "服务", "平台", "产品", "信息", "数据", "同意", "我们", "您的", "本协议",
    "本政策", "公司", "企业", "网站", "应用", "软件", "功能", "系统", "技术", "方式",
    "情况", "要求", "内容", "期间", "以上", "以下", "之前", "之后", "包括", "其他",
    "相关", "进行", "通过", "根据", "按照", "以及", "或者", "如果", "因此", "所以",
    "但是", "并且", "可以", "需要", "提供", "获得", "保护", "安全", "管理", "更新",
    "说明", "条件", "标准", "措施", "期限", "时间", "地址", "电话", "邮箱", "文件",
    "记录", "账户", "注册", "登录", "访问", "浏览", "发布", "上传", "下载", "修改",
    "确认", "申请", "审核", "批准", "拒绝", "停止", "暂停", "恢复", "继续",
];

/// Words never used as keywords.
pub const STOPWORDS: &[&str] = &[
    "的", "了", "和", "与", "及", "或", "在", "是", "为", "对", "将", "等", "我们", "您",
    "你", "我", "其", "该", "此", "这", "那", "以", "于", "由", "被", "把", "也", "都",
    "而", "并", "但", "如", "若", "则", "之", "就", "可", "会", "能", "中", "上", "下",
    "向", "从", "到", "个", "本", "所", "有", "无", "不", "一", "这些", "那些", "以及",
    "或者", "如果", "因此", "所以", "但是", "并且", "可以", "进行", "通过", "根据",
    "包括", "其他", "相关", "您的", "以上", "以下", "按照", "需要", "the", "a", "an",
    "of", "and", "or", "to", "in", "for", "on", "is", "are", "be", "by", "with",
];

/// Returns the default tokenizer vocabulary (legal terms + common words).
pub fn default_vocabulary() -> HashSet<String> {
    LEGAL_TERMS
        .iter()
        .chain(COMMON_WORDS.iter())
        .map(|w| w.to_string())
        .collect()
}

/// Returns the default stopword set.
pub fn default_stopwords() -> HashSet<String> {
    STOPWORDS.iter().map(|w| w.to_string()).collect()
}
