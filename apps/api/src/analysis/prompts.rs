use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

const RECOMMENDATION_PROMPT: &str = r#"Analyze the following resume and provide detailed career recommendations in JSON format.

Resume Content:
{resume_text}

Please provide a JSON response with the following structure:
{
    "top_companies": [
        {
            "name": "Company Name",
            "location": "City, State/Country",
            "match_reason": "Why this company matches the candidate",
            "hiring_process": "Step-by-step hiring process (interview rounds, tests, etc.)",
            "study_resources": ["Resource 1", "Resource 2", "Resource 3"]
        }
    ],
    "study_plan": {
        "overview": "Overall study plan description for the candidate",
        "timeline": "Suggested timeline (e.g., 3 months, 6 months)",
        "weekly_schedule": [
            {
                "day": "Monday",
                "topics": ["Topic 1", "Topic 2"],
                "hours": 2,
                "activities": "Description of activities"
            }
        ],
        "skill_gaps": ["Skill 1 to improve", "Skill 2 to learn"],
        "recommended_courses": [
            {
                "name": "Course Name",
                "platform": "Platform (Coursera, Udemy, etc.)",
                "duration": "Duration",
                "description": "Why this course is recommended"
            }
        ],
        "practice_projects": [
            {
                "title": "Project Title",
                "description": "Project description",
                "technologies": ["Tech 1", "Tech 2"],
                "difficulty": "Beginner/Intermediate/Advanced"
            }
        ],
        "certifications": [
            {
                "name": "Certification Name",
                "issuer": "Issuing Organization",
                "importance": "Why this certification matters"
            }
        ]
    }
}

Provide exactly 10 companies that would be a good fit based on the candidate's skills, experience, and qualifications. Include:
- Real companies that actually hire for these roles
- Specific locations (cities)
- Detailed hiring processes (e.g., "1. Online Application 2. Phone Screen 3. Technical Assessment 4. On-site Interview 5. HR Round")
- Practical study resources (courses, books, websites, certifications)

Create a comprehensive study plan that includes:
- Weekly schedule with specific topics and activities
- Skill gaps to address
- Recommended courses with platforms and durations
- Practice projects to build portfolio
- Important certifications to pursue

"#;

/// Career recommendation prompt for the extracted resume text.
pub fn recommendation_prompt(resume_text: &str) -> String {
    let mut prompt = RECOMMENDATION_PROMPT.replace("{resume_text}", resume_text);
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}
